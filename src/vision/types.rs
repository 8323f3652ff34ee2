/// One qualifying match: the center of the matched template in the frame's
/// pixel space plus its similarity score in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub x: u32,
    pub y: u32,
    pub score: f32,
}

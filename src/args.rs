use std::env;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// One-shot: search for a template and tap it once.
    Find(String),
    /// Continuous: cycle over a watch list until interrupted.
    Watch(Vec<String>),
    /// Capture a single frame and save it to screenshot.png.
    Screenshot,
    /// List the loaded templates and their shapes.
    ListTemplates,
}

#[derive(Debug)]
pub struct Args {
    pub mode: Mode,
    pub config_path: String,
    pub timeout_secs: Option<u64>,
    pub annotate_dir: Option<String>,
}

impl Args {
    pub fn parse() -> Option<Self> {
        let args: Vec<String> = env::args().collect();

        let mut mode: Option<Mode> = None;
        let mut config_path = "config.toml".to_string();
        let mut timeout_secs: Option<u64> = None;
        let mut annotate_dir: Option<String> = None;

        for arg in args.iter().skip(1) {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!("vision-tap v{}", env!("CARGO_PKG_VERSION"));
                return None;
            } else if arg == "--screenshot" || arg == "-s" {
                mode = Some(Mode::Screenshot);
            } else if arg == "--list-templates" {
                mode = Some(Mode::ListTemplates);
            } else if let Some(name) = arg.strip_prefix("--find=") {
                if name.is_empty() {
                    eprintln!("❌ --find requires a template name");
                    return None;
                }
                mode = Some(Mode::Find(name.to_string()));
            } else if let Some(list) = arg.strip_prefix("--watch=") {
                let names: Vec<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if names.is_empty() {
                    eprintln!("❌ --watch requires at least one template name");
                    return None;
                }
                mode = Some(Mode::Watch(names));
            } else if let Some(path) = arg.strip_prefix("--config=") {
                config_path = path.to_string();
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                match val.parse::<u64>() {
                    Ok(secs) => timeout_secs = Some(secs),
                    Err(_) => {
                        eprintln!("❌ Invalid timeout value: {}", val);
                        return None;
                    }
                }
            } else if let Some(dir) = arg.strip_prefix("--annotate=") {
                annotate_dir = Some(dir.to_string());
            } else {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            }
        }

        let Some(mode) = mode else {
            print_help();
            return None;
        };

        Some(Args {
            mode,
            config_path,
            timeout_secs,
            annotate_dir,
        })
    }
}

fn print_help() {
    println!("🤖 vision-tap - screen-driven Android emulator automation");
    println!();
    println!("USAGE:");
    println!("    vision-tap [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --find=NAME           Find the template once and tap it");
    println!("    --watch=A,B,...       Watch the listed templates until ctrl-c");
    println!("    --screenshot, -s      Capture one frame to screenshot.png");
    println!("    --list-templates      Show loaded templates and their shapes");
    println!("    --config=PATH         Config file path (default: config.toml)");
    println!("    --timeout=N           Search deadline in seconds for --find");
    println!("    --annotate=DIR        Save an annotated frame on every hit");
    println!("    --help, -h            Show this help message");
    println!("    --version, -v         Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    vision-tap --find=button_start --timeout=10");
    println!("    vision-tap --watch=button_start,claim_reward");
    println!("    vision-tap --config=configs/emu.toml --screenshot");
}

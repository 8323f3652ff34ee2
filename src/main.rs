use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::Duration;
use vision_tap::args::{Args, Mode};
use vision_tap::automation::LoopOutcome;
use vision_tap::capture::{FrameSource, ScreenSource};
use vision_tap::device::{AdbTransport, DeviceChannel};
use vision_tap::vision::TemplateLibrary;
use vision_tap::{Bot, BotConfig};

fn main() -> ExitCode {
    env_logger::init();

    let Some(args) = Args::parse() else {
        return ExitCode::SUCCESS;
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(args))
}

async fn run(args: Args) -> ExitCode {
    let config = match BotConfig::load(&args.config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut source = match ScreenSource::new(
        config.capture.region,
        config.output_size(),
        config.capture.max_fps,
    ) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("❌ Could not open the capture source: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Screenshot mode needs no templates and no device.
    if args.mode == Mode::Screenshot {
        return screenshot(&mut source).await;
    }

    let mut library = TemplateLibrary::new();
    match library.load_dir(&config.matching.template_dir) {
        Ok(count) => println!("📚 Loaded {count} template(s) from {}", config.matching.template_dir),
        Err(e) => {
            eprintln!("❌ Could not load templates: {e}");
            return ExitCode::FAILURE;
        }
    }

    if args.mode == Mode::ListTemplates {
        return list_templates(&library);
    }

    let transport = AdbTransport::new(&config.device.adb_path);
    let channel = DeviceChannel::new(transport, config.endpoint(), config.delays());
    let mut bot = Bot::new(&config, source, library, channel);
    if let Some(dir) = &args.annotate_dir {
        bot = bot.with_annotate_dir(dir);
    }

    let cancel = bot.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            println!("🛑 Interrupt received, finishing the current step...");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let code = match &args.mode {
        Mode::Find(name) => {
            let timeout = args
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.default_timeout());
            match bot.find_and_tap(name, timeout).await {
                Ok(LoopOutcome::Found { device_point, score, .. }) => {
                    println!(
                        "🎯 Tapped '{}' at ({}, {}) with score {:.3}",
                        name, device_point.x, device_point.y, score
                    );
                    ExitCode::SUCCESS
                }
                Ok(LoopOutcome::NotFound) => {
                    println!("❌ '{name}' not found within {timeout:?}");
                    ExitCode::FAILURE
                }
                Err(e) => {
                    eprintln!("❌ Search failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Mode::Watch(names) => match bot.run(names).await {
            Ok(()) => {
                println!("✅ Watch loop finished after {} cycle(s)", bot.cycles());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Watch loop failed: {e}");
                ExitCode::FAILURE
            }
        },
        Mode::Screenshot | Mode::ListTemplates => unreachable!("handled before device setup"),
    };

    bot.shutdown().await;
    code
}

async fn screenshot(source: &mut ScreenSource) -> ExitCode {
    let code = match source.capture().await {
        Ok(frame) => {
            let path = "screenshot.png";
            match frame.image().save(path) {
                Ok(()) => {
                    println!("📸 Saved {}x{} frame to {path}", frame.width(), frame.height());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("❌ Could not save screenshot: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Capture failed: {e}");
            ExitCode::FAILURE
        }
    };
    source.close();
    code
}

fn list_templates(library: &TemplateLibrary) -> ExitCode {
    if library.is_empty() {
        println!("No templates loaded.");
        return ExitCode::SUCCESS;
    }
    for name in library.names() {
        if let Some((height, width)) = library.shape_of(name) {
            println!("  {name}  ({width}x{height})");
        }
    }
    ExitCode::SUCCESS
}

use playa_notes::cli::{Args, Command};
use playa_notes::config::{self, NotesSettings};
use playa_notes::review::{self, ReviewError, ReviewOrchestrator};
use playa_notes::session::{Session, SessionSource};
use playa_notes::ReviewHost;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::Path;

fn init_logging(args: &Args, path_config: &config::PathConfig) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE, path_config));

        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

fn load_session(path: &Path, create: bool) -> Result<Session> {
    if path.exists() {
        Session::from_json(path)
    } else if create {
        info!("Creating session {}", path.display());
        Ok(Session::new())
    } else {
        anyhow::bail!("Session not found: {}", path.display())
    }
}

fn run(args: Args, settings: NotesSettings) -> Result<()> {
    let creates = matches!(args.command, Command::Source { .. });
    let mut session = load_session(&args.session, creates)?;

    let result = dispatch(&args.command, &mut session, &settings);

    // Blank-frame cleanup runs before the "no annotations" check, so an
    // aborted command may still have changed the session
    if args.command.mutates_session() {
        match session.to_json(&args.session) {
            Ok(()) => debug!("Session saved: {}", args.session.display()),
            Err(e) if result.is_err() => warn!("Session not saved: {:#}", e),
            Err(e) => return Err(e),
        }
    }
    result
}

fn dispatch(command: &Command, session: &mut Session, settings: &NotesSettings) -> Result<()> {
    let orchestrator = ReviewOrchestrator::new(settings);
    let now = chrono::Local::now();

    match command {
        Command::Source {
            path,
            node,
            name,
            start,
            length,
            size,
        } => {
            let node = node
                .clone()
                .unwrap_or_else(|| format!("source{:03}", session.sources().len() + 1));
            let mut source = SessionSource::new(node.as_str(), path.as_path(), *start, *length);
            if let Some(name) = name {
                source = source.with_display_name(name.as_str());
            }
            if let Some([w, h]) = size.as_deref() {
                source = source.with_size(*w, *h);
            }
            session.add_source(source)?;
            println!("{} -> frames {}..{}", node, session.sequence_length() - length + 1, session.sequence_length());
        }
        Command::Add { text, frame } => {
            let frame = frame.unwrap_or_else(|| session.current_frame());
            let added = review::add_note(session, settings, text, frame)?;
            println!("Note added on {} frame {}", added.paint_node, added.frame);
        }
        Command::Report { frame, clipboard } => {
            session.set_clipboard_file(clipboard.clone());
            let clip = ReviewOrchestrator::clip_at(&*session, frame.unwrap_or_else(|| session.current_frame()))?;
            let report = orchestrator.copy_report(session, &clip, &now)?;
            print!("{}", report);
        }
        Command::Export { frame, out, clipboard } => {
            session.set_clipboard_file(clipboard.clone());
            let clip = ReviewOrchestrator::clip_at(&*session, frame.unwrap_or_else(|| session.current_frame()))?;
            let outcome = if out.is_some() {
                let settings = NotesSettings {
                    export_root: out.clone(),
                    ..settings.clone()
                };
                ReviewOrchestrator::new(&settings).export(session, &clip, &now)?
            } else {
                orchestrator.export(session, &clip, &now)?
            };
            println!("Exported to {}", outcome.folder.display());
            if let Some(report) = &outcome.report_path {
                println!("  report:  {}", report.display());
            }
            if let Some(snapshot) = &outcome.session_path {
                println!("  session: {}", snapshot.display());
            }
            println!("  frames:  {}", outcome.frames_exported);
        }
        Command::Frames { frame } => {
            let clip = ReviewOrchestrator::clip_at(&*session, frame.unwrap_or_else(|| session.current_frame()))?;
            let notes = orchestrator.scan(&*session, &clip);
            for frame in &notes.frames {
                println!("{}\t{}", frame.frame, frame.lines.join(" | "));
            }
            debug!("{} blank frame(s) pending cleanup", notes.cleanup.len());
        }
        Command::Clean { frame } => {
            let clip = ReviewOrchestrator::clip_at(&*session, frame.unwrap_or_else(|| session.current_frame()))?;
            let notes = orchestrator.check_annotations(session, &clip)?;
            println!("{} annotated frame(s) on {}", notes.frames.len(), clip.display_name);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    init_logging(&args, &path_config)?;
    debug!("Command-line args: {:?}", args);

    let settings_path = config::config_file(config::SETTINGS_FILE, &path_config);
    info!("Config path: {}", settings_path.display());
    let settings = NotesSettings::load(&settings_path);

    match run(args, settings) {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<ReviewError>() {
            Some(review_err) if review_err.is_precondition() => {
                warn!("{}", review_err);
                eprintln!("{}", review_err);
                std::process::exit(2);
            }
            _ => Err(e),
        },
    }
}

use std::{error::Error, path::PathBuf};

use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use eframe::{egui::ViewportBuilder, run_native};
use music_alarm::{
    alarm::{AlarmConfig, AlarmWidget, TARGET_TIME_FORMAT},
    config::Config,
    media, MusicAlarm,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// use this config file instead of the default one
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// alarm time, HH:MM (24 hour)
    #[clap(long, value_parser = parse_alarm_time)]
    time: Option<String>,
    /// video to open when the alarm goes off
    #[clap(long)]
    link: Option<String>,
    /// set the alarm right away
    #[clap(long, requires_all = ["time", "link"])]
    arm: bool,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// write the default config
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// show the video id and thumbnail for a link
    Preview { link: String },
}

fn parse_alarm_time(time: &str) -> Result<String, String> {
    NaiveTime::parse_from_str(time, TARGET_TIME_FORMAT)
        .map(|time| time.format(TARGET_TIME_FORMAT).to_string())
        .map_err(|_| format!("{time:?} is not a HH:MM time"))
}

fn main() -> Result<(), Box<dyn Error>> {
    // a missing log file shouldn't stop anyone from waking up
    if let Err(e) = simple_file_logger::init_logger!("music_alarm") {
        eprintln!("couldn't initialize logger: {e:?}");
    }

    let args = Args::parse();
    let config_path = match args.config {
        Some(path) => Some(path),
        None => Config::config_path()
            .map_err(|e| log::warn!("{e}"))
            .ok(),
    };

    match args.command {
        Some(Command::Init { force }) => {
            let path = config_path.ok_or("couldn't find a config directory")?;
            if force || !path.exists() {
                Config::new().save(&path)?;
                println!("wrote default config to {}", path.display());
            } else {
                println!(
                    "config already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            return Ok(());
        }
        Some(Command::Preview { link }) => {
            let id = media::extract_media_id(&link)
                .ok_or_else(|| format!("no media id found in {link:?}"))?;
            println!("media id: {id}");
            println!("thumbnail: {}", media::thumbnail_url(&id));
            return Ok(());
        }
        None => {}
    }

    let config = config_path
        .as_deref()
        .map(Config::load_or_default)
        .unwrap_or_default();
    let mut alarm = AlarmWidget::new(config.time_format.clone()).with_config(AlarmConfig::new(
        args.time.unwrap_or_default(),
        args.link.unwrap_or_default(),
    ));
    if args.arm {
        alarm.arm()?;
    }

    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title("Music Alarm Clock")
            .with_inner_size([400.0, 680.0]),
        ..Default::default()
    };
    run_native(
        "Music Alarm Clock",
        native_options,
        Box::new(move |cc| Ok(Box::new(MusicAlarm::new(cc, config, config_path, alarm)))),
    )
    .map_err(|e| e.into())
}

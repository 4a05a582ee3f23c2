//! Interactive player: a play button and volume/pan sliders driven by line commands on stdin
//!
//! Commands: `play`, `volume <v>`, `pan <v>`, `record <path>`, `stop-record`, `status`, `quit`

use std::io::BufRead;
use std::path::{Path, PathBuf};

use clap::Parser;
use crossbeam_channel::Sender;

use web_play_rec::context::AudioContextOptions;
use web_play_rec::media::MediaElement;
use web_play_rec::panel::{Panel, PanelConfig, UiEvent};
use web_play_rec::record::{InputCapture, Recorder, RecorderError};

#[derive(Parser, Debug)]
#[command(name = "webplayrec")]
#[command(about = "Play a track with volume and pan controls, reporting button presses")]
#[command(version)]
struct Args {
    /// Base url of the server receiving button presses
    #[arg(long, default_value = "http://localhost:5000", env = "WEBPLAYREC_SERVER_URL")]
    server_url: String,

    /// Audio output device, "none" renders without a device
    #[arg(long, default_value = "")]
    sink_id: String,

    /// Record the default input to this WAV file from the start
    #[arg(long)]
    record: Option<PathBuf>,

    /// Ogg Vorbis or WAV file to play
    media: PathBuf,
}

#[derive(Debug, PartialEq)]
enum Command {
    Ui(UiEvent),
    Record(PathBuf),
    StopRecord,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let name = words.next().unwrap_or_default();
    let arg = words.next();

    let value = |arg: Option<&str>| -> Result<f32, String> {
        arg.ok_or_else(|| format!("`{}` needs a value", name))?
            .parse::<f32>()
            .map_err(|e| format!("invalid value for `{}`: {}", name, e))
    };

    let command = match name {
        "play" => Command::Ui(UiEvent::PlayClicked),
        "volume" => Command::Ui(UiEvent::VolumeInput(value(arg)?)),
        "pan" => Command::Ui(UiEvent::PanInput(value(arg)?)),
        "status" => Command::Ui(UiEvent::Status),
        "quit" => Command::Ui(UiEvent::Quit),
        "record" => match arg {
            Some(path) => Command::Record(PathBuf::from(path)),
            None => return Err("`record` needs a file path".to_string()),
        },
        "stop-record" => Command::StopRecord,
        other => return Err(format!("unknown command `{}`", other)),
    };

    Ok(command)
}

/// The input device is only opened on the first recording
#[derive(Default)]
struct Input {
    recorder: Recorder,
    capture: Option<InputCapture>,
}

impl Input {
    fn record(&mut self, path: &Path) -> Result<(), RecorderError> {
        let capture = match self.capture.take() {
            Some(capture) => capture,
            None => InputCapture::open(self.recorder.clone())?,
        };
        let result = capture.record(path);
        self.capture = Some(capture);
        result
    }

    fn stop(&self) -> Result<Option<PathBuf>, RecorderError> {
        self.recorder.stop()
    }
}

fn read_commands(sender: Sender<UiEvent>, mut input: Input) {
    let stdin = std::io::stdin();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("Unable to read stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(Command::Ui(UiEvent::Quit)) => break,
            Ok(Command::Ui(event)) => {
                if sender.send(event).is_err() {
                    return;
                }
            }
            Ok(Command::Record(path)) => {
                if let Err(e) = input.record(&path) {
                    log::error!("Unable to record to {}: {}", path.display(), e);
                }
            }
            Ok(Command::StopRecord) => match input.stop() {
                Ok(Some(path)) => println!("saved {}", path.display()),
                Ok(None) => println!("not recording"),
                Err(e) => log::error!("Recording failed: {}", e),
            },
            Err(message) => eprintln!("{}", message),
        }
    }

    // finalize a running take before the player shuts down
    drop(input);
    let _ = sender.send(UiEvent::Quit);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let element = MediaElement::new(&args.media)?;
    log::info!(
        "Loaded {} ({:.2}s)",
        args.media.display(),
        element.duration()
    );

    let config = PanelConfig {
        server_url: args.server_url,
        context: AudioContextOptions {
            sink_id: args.sink_id,
            ..AudioContextOptions::default()
        },
    };
    let mut panel = Panel::new(element, config);

    let mut input = Input::default();
    if let Some(path) = args.record.as_ref() {
        input.record(path)?;
    }

    let sender = panel.sender();
    std::thread::spawn(move || read_commands(sender, input));

    panel.run();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("play"), Ok(Command::Ui(UiEvent::PlayClicked)));
        assert_eq!(
            parse_command("volume 0.5"),
            Ok(Command::Ui(UiEvent::VolumeInput(0.5)))
        );
        assert_eq!(
            parse_command("  pan   -1 "),
            Ok(Command::Ui(UiEvent::PanInput(-1.)))
        );
        assert_eq!(
            parse_command("record take.wav"),
            Ok(Command::Record(PathBuf::from("take.wav")))
        );
        assert_eq!(parse_command("stop-record"), Ok(Command::StopRecord));
        assert_eq!(parse_command("quit"), Ok(Command::Ui(UiEvent::Quit)));
    }

    #[test]
    fn test_parse_invalid_commands() {
        assert!(parse_command("volume").is_err());
        assert!(parse_command("pan left").is_err());
        assert!(parse_command("record").is_err());
        assert!(parse_command("rewind").is_err());
    }
}

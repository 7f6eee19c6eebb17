//! Integration hooks for text front-ends.
//!
//! Maps a line of console input onto a [`ControlEvent`] or a console-only
//! action. Plain text is a feeling; lines starting with `/` are commands.

use garden_core::scenario::GardenTool;
use garden_core::types::{TimeOfDay, WeatherKind};
use thiserror::Error;

use crate::events::ControlEvent;

/// Help text listing every command.
pub const HELP: &str = "\
commands:
  <text>                  tell the garden how you feel
  /water /prune /chase    use a garden tool
  /time dawn|day|dusk|night|auto
  /weather clear|cloudy|rainy|storm|auto
  /wind <0..1>|auto
  /lightning              strike lightning
  /memories               list what the garden remembers
  /recall <n>             bring memory number n back
  /clear                  forget everything
  /help                   this text
  /quit                   close the garden";

/// What a console line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleAction {
    /// Forward straight to the host.
    Event(ControlEvent),
    /// Print the memory list.
    ListMemories,
    /// Recall the memory at this 1-based position in the list.
    RecallIndex(usize),
    /// Print [`HELP`].
    Help,
    /// Shut down and exit.
    Quit,
    /// Blank line.
    Nothing,
}

/// A line that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// Parse one line of console input.
///
/// # Errors
/// Returns a [`ParseError`] naming the problem for unknown commands or bad
/// arguments.
pub fn parse_line(line: &str) -> Result<ConsoleAction, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ConsoleAction::Nothing);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(ConsoleAction::Event(ControlEvent::SubmitText(line.to_string())));
    };

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default().to_ascii_lowercase();
    let arg = words.next().map(str::to_ascii_lowercase);

    let event = match name.as_str() {
        "water" => ControlEvent::UseTool(GardenTool::Water),
        "prune" => ControlEvent::UseTool(GardenTool::Prune),
        "chase" => ControlEvent::UseTool(GardenTool::Chase),
        "time" => ControlEvent::SetTimeOfDay(parse_auto(arg.as_deref(), parse_phase)?),
        "weather" => ControlEvent::SetWeather(parse_auto(arg.as_deref(), parse_weather)?),
        "wind" => ControlEvent::SetWind(parse_auto(arg.as_deref(), parse_wind)?),
        "lightning" => ControlEvent::TriggerLightning,
        "clear" => ControlEvent::ClearMemories,
        "memories" => return Ok(ConsoleAction::ListMemories),
        "recall" => {
            let n = arg
                .as_deref()
                .and_then(|a| a.parse::<usize>().ok())
                .filter(|n| *n >= 1)
                .ok_or_else(|| ParseError("usage: /recall <n>".into()))?;
            return Ok(ConsoleAction::RecallIndex(n));
        }
        "help" => return Ok(ConsoleAction::Help),
        "quit" | "exit" => return Ok(ConsoleAction::Quit),
        other => return Err(ParseError(format!("unknown command: /{other}"))),
    };
    Ok(ConsoleAction::Event(event))
}

/// `auto` releases an override; anything else goes through `parse`.
fn parse_auto<T>(
    arg: Option<&str>,
    parse: fn(&str) -> Result<T, ParseError>,
) -> Result<Option<T>, ParseError> {
    match arg {
        None => Err(ParseError("missing argument".into())),
        Some("auto") => Ok(None),
        Some(value) => parse(value).map(Some),
    }
}

fn parse_phase(value: &str) -> Result<TimeOfDay, ParseError> {
    match value {
        "dawn" => Ok(TimeOfDay::Dawn),
        "day" => Ok(TimeOfDay::Day),
        "dusk" => Ok(TimeOfDay::Dusk),
        "night" => Ok(TimeOfDay::Night),
        other => Err(ParseError(format!("unknown time of day: {other}"))),
    }
}

fn parse_weather(value: &str) -> Result<WeatherKind, ParseError> {
    match value {
        "clear" => Ok(WeatherKind::Clear),
        "cloudy" => Ok(WeatherKind::Cloudy),
        "rainy" | "rain" => Ok(WeatherKind::Rainy),
        "storm" => Ok(WeatherKind::Storm),
        other => Err(ParseError(format!("unknown weather: {other}"))),
    }
}

fn parse_wind(value: &str) -> Result<f32, ParseError> {
    value
        .parse::<f32>()
        .ok()
        .filter(|w| w.is_finite())
        .ok_or_else(|| ParseError(format!("not a wind intensity: {value}")))
}

//! Control events the UI sends to the garden, and what comes back.

use garden_core::scenario::GardenTool;
use garden_core::types::{MemoryId, TimeOfDay, WeatherKind};
use garden_core::{MemoryRecord, Submission};

/// A user action forwarded to the driver task.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// The visitor typed something and pressed enter.
    SubmitText(String),
    /// Water, prune or chase.
    UseTool(GardenTool),
    /// Pin the phase of the day; `None` returns to the automatic cycle.
    SetTimeOfDay(Option<TimeOfDay>),
    /// Force the base weather; `None` returns to automatic weather.
    SetWeather(Option<WeatherKind>),
    /// Force the wind; `None` returns to automatic wind.
    SetWind(Option<f32>),
    /// Strike lightning now.
    TriggerLightning,
    /// Bring a stored memory back.
    Recall(MemoryId),
    /// List every stored memory, oldest first.
    ListMemories,
    /// Forget everything.
    ClearMemories,
    /// Any interaction that should reset the inactivity counter.
    Interaction,
    /// Stop the garden and end the driver task.
    Shutdown,
}

impl ControlEvent {
    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::SubmitText(_) => "submit_text",
            Self::UseTool(_) => "use_tool",
            Self::SetTimeOfDay(_) => "set_time_of_day",
            Self::SetWeather(_) => "set_weather",
            Self::SetWind(_) => "set_wind",
            Self::TriggerLightning => "trigger_lightning",
            Self::Recall(_) => "recall",
            Self::ListMemories => "list_memories",
            Self::ClearMemories => "clear_memories",
            Self::Interaction => "interaction",
            Self::Shutdown => "shutdown",
        }
    }
}

/// The garden's answer to a [`ControlEvent`].
#[derive(Debug, Clone)]
pub enum Outcome {
    /// `None` when the text was empty or the garden has stopped.
    Submitted(Option<Submission>),
    /// `None` when the tool was unavailable.
    ToolUsed(Option<MemoryRecord>),
    /// `None` when no memory had that ID.
    Recalled(Option<MemoryRecord>),
    /// Whether a new strike started.
    Lightning(bool),
    /// Stored memories, oldest first.
    Memories(Vec<MemoryRecord>),
    /// The event was applied and has nothing to report.
    Applied,
}

use tokio::sync::mpsc;

/// Notifications from the connection to the rest of the client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Connect or map download progress in `0.0..=1.0`.
    Loading(f32),
    /// The login packet went out.
    Connected,
    /// The session ended. `title` and `reason` are shown to the player.
    Disconnected { title: String, reason: String },
    /// Block place/delete permissions changed.
    PermissionsChanged,
    /// A chat line to show locally.
    Chat(String),
    /// Jump height returns to its default after a garbled HackControl.
    ResetJumpHeight,
}

pub type EventSender = mpsc::UnboundedSender<ClientEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ClientEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

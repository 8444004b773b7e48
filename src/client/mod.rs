//! Client side of futquiz: the quiz session state machine and everything it is
//! wired to when played from a terminal.

/// Per-game daily completion records and the clock they are keyed on.
pub mod completion;
/// Effect runner feeding background outcomes back into a session.
pub mod driver;
/// Quiz server access.
pub mod gateway;
/// The session reducer.
pub mod machine;
/// Text skins.
pub mod render;
/// Score rating, share text and next-quiz countdown.
pub mod summary;
/// Per-question countdown settings and ticker.
pub mod timer;

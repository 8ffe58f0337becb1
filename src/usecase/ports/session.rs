/// Credential holder handed to the HTTP adapters. The table engine never
/// talks to it.
pub trait Session: Send + Sync {
    fn bearer_token(&self) -> Option<String>;

    /// Called when the API answers 401; the session is expected to drop
    /// whatever credential it handed out.
    fn on_unauthorized(&self) {}
}

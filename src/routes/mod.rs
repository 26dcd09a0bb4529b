/// Router Module Index
///
/// Public routes are open to anyone. Every protected route wraps its handler in
/// a `require_permission` layer built for exactly one permission string, so a
/// handler can never run without its guard.
pub mod drinks;

//! Which pages a visitor may open.

use model::AuthUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Analysis,
    Auth,
}

/// Analysis needs a stored session; the sign-in page is only offered to
/// visitors without one.
pub fn reachable(page: Page, authenticated: bool) -> bool {
    match page {
        Page::Home => true,
        Page::Analysis => authenticated,
        Page::Auth => !authenticated,
    }
}

/// Page actually shown when `requested` is asked for.
pub fn resolve(requested: Page, authenticated: bool) -> Page {
    if reachable(requested, authenticated) {
        return requested;
    }
    match requested {
        Page::Analysis => Page::Auth,
        _ => Page::Home,
    }
}

/// Name used in the greeting: the local part of the email, capitalized.
pub fn greeting_name(user: &AuthUser) -> Option<String> {
    let local = user.email.split('@').next().unwrap_or("");
    let mut chars = local.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

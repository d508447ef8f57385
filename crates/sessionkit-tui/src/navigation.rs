//! Screen stack for the terminal front-end.

/// Every screen the application can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Start-up screen shown while the session loads.
    Layout,
    Welcome,
    Login,
    Signup,
    Home,
}

impl Route {
    pub fn title(&self) -> &'static str {
        match self {
            Route::Layout => "Loading",
            Route::Welcome => "Welcome",
            Route::Login => "Sign in",
            Route::Signup => "Sign up",
            Route::Home => "Home",
        }
    }
}

/// A stack of routes. The top of the stack is the visible screen and the
/// stack is never empty.
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Layout)
    }
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        Self {
            stack: vec![initial],
        }
    }

    pub fn current(&self) -> Route {
        // The stack always holds at least the root route
        self.stack.last().copied().unwrap_or(Route::Layout)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self, route: Route) {
        self.stack.push(route);
    }

    /// Go back one screen. Returns false (and does nothing) at the root.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Replace the whole stack with a single route.
    pub fn reset(&mut self, route: Route) {
        self.stack.clear();
        self.stack.push(route);
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_layout() {
        let nav = Navigator::default();
        assert_eq!(nav.current(), Route::Layout);
        assert_eq!(nav.depth(), 1);
        assert!(!nav.can_go_back());
    }

    #[test]
    fn test_push_and_pop() {
        let mut nav = Navigator::new(Route::Welcome);
        nav.push(Route::Login);
        nav.push(Route::Signup);
        assert_eq!(nav.current(), Route::Signup);

        assert!(nav.pop());
        assert_eq!(nav.current(), Route::Login);
        assert!(nav.pop());
        assert_eq!(nav.current(), Route::Welcome);
        assert!(!nav.pop());
        assert_eq!(nav.current(), Route::Welcome);
    }

    #[test]
    fn test_reset_replaces_stack() {
        let mut nav = Navigator::new(Route::Welcome);
        nav.push(Route::Login);
        nav.reset(Route::Home);
        assert_eq!(nav.current(), Route::Home);
        assert_eq!(nav.depth(), 1);
    }
}

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Bills,
    NewBill,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Bills => "#employee/bills",
            Route::NewBill => "#employee/bill/new",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Receives route changes requested by the controllers.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Remembers every route it was asked to show, most recent last.
#[derive(Default)]
pub struct RouteHistory {
    routes: std::sync::Mutex<Vec<Route>>,
}

impl RouteHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Route> {
        self.routes
            .lock()
            .map(|routes| routes.last().copied())
            .unwrap_or(None)
    }

    pub fn visited(&self) -> Vec<Route> {
        self.routes
            .lock()
            .map(|routes| routes.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RouteHistory {
    fn navigate(&self, route: Route) {
        tracing::info!(route = %route, "navigation: route requested");
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route);
        }
    }
}

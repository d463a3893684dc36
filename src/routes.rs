use std::fmt;

/// Screens a flow can send the user to after it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Register,
    Login,
    Home,
    Account,
    Contact,
    Donations,
    Thread(i64),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Register => "/registro".to_string(),
            Route::Login => "/inicioSesion".to_string(),
            Route::Home => "/principal".to_string(),
            Route::Account => "/cuenta".to_string(),
            Route::Contact => "/contacto".to_string(),
            Route::Donations => "/donaciones".to_string(),
            Route::Thread(id) => format!("/hilo/{}", id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Result of a flow that also moves the user to another screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigate<T> {
    pub value: T,
    pub to: Route,
}

impl<T> Navigate<T> {
    pub fn new(value: T, to: Route) -> Self {
        Self { value, to }
    }
}

//! Client-side routes.

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Create,
    Signup,
    Post(String),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Create => f.write_str("/create"),
            Route::Signup => f.write_str("/signup"),
            Route::Post(id) => write!(f, "/post/{id}"),
        }
    }
}

impl FromStr for Route {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim().trim_end_matches('/');
        match path {
            "" => Ok(Route::Home),
            "/create" => Ok(Route::Create),
            "/signup" => Ok(Route::Signup),
            _ => match path.strip_prefix("/post/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Ok(Route::Post(id.to_string())),
                _ => Err(AppError::NotFound("route".into(), s.to_string())),
            },
        }
    }
}

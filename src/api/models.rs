/// Endpoints of the vault service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Check,
    Exist,
    Extract,
    Hash,
    Import,
    Info,
    List,
    Query,
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Check => "check",
            Route::Exist => "exist",
            Route::Extract => "extract",
            Route::Hash => "hash",
            Route::Import => "import",
            Route::Info => "info",
            Route::List => "list",
            Route::Query => "query",
        }
    }

    pub fn path(&self) -> String {
        format!("/{}", self.name())
    }
}

/// A signed call to one route.
///
/// `context` is the exact string the server rebuilds to check the `auth`
/// parameter: the route name, optionally followed by a single space and the
/// one argument that identifies the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    pub route: Route,
    pub context: String,
    pub params: Vec<(&'static str, String)>,
}

impl RemoteRequest {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            context: route.name().to_string(),
            params: Vec::new(),
        }
    }

    pub fn with_subject(route: Route, subject: &str) -> Self {
        Self {
            route,
            context: format!("{} {}", route.name(), subject),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }
}

/// File part and plain fields of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_field: &'static str,
    pub fields: Vec<(&'static str, String)>,
}

use crate::user::Profile;
use actix_session::Session;
use actix_web::dev::{
    self, Extensions, Payload, Service, ServiceRequest, ServiceResponse, Transform,
};
use actix_web::{web::Data, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use sea_orm::DatabaseConnection;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Client data stored for a single request cycle.
/// Distinct from ClientCtx because it is defined through request data.
#[derive(Clone, Debug)]
pub struct ClientCtxInner {
    /// User data. Optional. None is a guest user.
    pub client: Option<Profile>,
    /// Unread message count for the user
    pub unread_messages: u64,
    /// Time the request started for page load statistics.
    pub request_start: Instant,
}

impl Default for ClientCtxInner {
    fn default() -> Self {
        Self {
            client: None,
            unread_messages: 0,
            request_start: Instant::now(),
        }
    }
}

impl ClientCtxInner {
    pub async fn from_session(session: &Session, db: &DatabaseConnection) -> Self {
        let client = match crate::session::get_user_id(session) {
            Some(id) => match Profile::get_by_id(db, id).await {
                Ok(profile) => profile,
                Err(e) => {
                    log::error!("ClientCtx: unable to load user {}: {}", id, e);
                    None
                }
            },
            None => None,
        };

        let unread_messages = match client {
            Some(ref user) => match crate::messages::unread_count(db, user.id).await {
                Ok(count) => count,
                Err(e) => {
                    log::error!("ClientCtx: unable to count unread messages for {}: {}", user.id, e);
                    0
                }
            },
            None => 0,
        };

        ClientCtxInner {
            client,
            unread_messages,
            ..Default::default()
        }
    }
}

/// Client context passed to routes.
/// Wraps ClientCtxInner, which is set at the beginning of the request.
#[derive(Clone, Debug)]
pub struct ClientCtx(Data<ClientCtxInner>);

impl Default for ClientCtx {
    fn default() -> Self {
        Self(Data::new(ClientCtxInner::default()))
    }
}

impl ClientCtx {
    pub async fn from_session(session: &Session, db: &DatabaseConnection) -> Self {
        Self(Data::new(ClientCtxInner::from_session(session, db).await))
    }

    pub fn get_or_default_from_extensions(extensions: &mut Extensions) -> Self {
        match extensions.get::<Data<ClientCtxInner>>() {
            // Existing record in extensions; pull it and return clone.
            Some(cbox) => Self(cbox.clone()),
            // No existing record; create and insert it.
            None => {
                let cbox = Data::new(ClientCtxInner::default());
                extensions.insert(cbox.clone());
                Self(cbox)
            }
        }
    }

    /// Returns either the user's id or None.
    pub fn get_id(&self) -> Option<i32> {
        self.0.client.as_ref().map(|u| u.id)
    }

    /// Returns either the user's name or the word for guest.
    pub fn get_name(&self) -> String {
        match &self.0.client {
            Some(user) => user.username.to_owned(),
            None => "Guest".to_owned(),
        }
    }

    pub fn get_user(&self) -> Option<&Profile> {
        self.0.client.as_ref()
    }

    pub fn get_unread_messages(&self) -> u64 {
        self.0.unread_messages
    }

    pub fn is_user(&self) -> bool {
        self.0.client.is_some()
    }

    pub fn is_staff(&self) -> bool {
        self.0.client.as_ref().map(|u| u.is_staff).unwrap_or(false)
    }

    /// True when the logged in user wrote the row owned by `user_id`.
    pub fn owns(&self, user_id: &i32) -> bool {
        self.get_id() == Some(*user_id)
    }

    /// Returns Duration representing request time.
    pub fn request_time(&self) -> Duration {
        Instant::now() - self.0.request_start
    }

    /// Returns human readable representing request time.
    pub fn request_time_as_string(&self) -> String {
        let us = self.request_time().as_micros();
        if us > 5000 {
            format!("{}ms", us / 1000)
        } else {
            format!("{}μs", us)
        }
    }

    /// Require user to be logged in. Returns user_id or Unauthorized.
    pub fn require_login(&self) -> Result<i32, crate::error::Error> {
        self.get_id().ok_or(crate::error::Error::Unauthorized)
    }

    /// Require a staff account.
    pub fn require_staff(&self) -> Result<i32, crate::error::Error> {
        let id = self.require_login()?;
        if self.is_staff() {
            Ok(id)
        } else {
            Err(crate::error::Error::permission_denied(
                "Staff access required.",
            ))
        }
    }
}

/// This implementation is what actually provides the `client: ClientCtx` in the parameters of route functions.
impl FromRequest for ClientCtx {
    /// The associated error which can be returned.
    type Error = Error;
    /// Future that resolves to a Self.
    type Future = Ready<Result<Self, Self::Error>>;

    /// Create a Self from request parts asynchronously.
    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(ClientCtx::get_or_default_from_extensions(
            &mut req.extensions_mut(),
        )))
    }
}

impl<S: 'static, B> Transform<S, ServiceRequest> for ClientCtx
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ClientCtxMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ClientCtxMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Client context middleware
pub struct ClientCtxMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ClientCtxMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();

        // Borrows of `req` must be done in a precise way to avoid conflicts. This order is important.
        let (httpreq, payload) = req.into_parts();
        let session = Session::extract(&httpreq).into_inner();
        let req = ServiceRequest::from_parts(httpreq, payload);

        // Without a database there is no client to load; routes see a guest.
        Box::pin(async move {
            if let Some(db) = req.app_data::<Data<DatabaseConnection>>() {
                let db = db.clone();

                match session {
                    Ok(session) => {
                        let inner = ClientCtxInner::from_session(&session, &db).await;
                        req.extensions_mut().insert(Data::new(inner));
                    }
                    Err(err) => {
                        log::error!("Unable to extract Session data in middleware: {}", err);
                    }
                };
            };

            svc.call(req).await
        })
    }
}

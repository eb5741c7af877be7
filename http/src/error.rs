use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
};

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Encoding the gathered metrics failed: {0}")]
    Encode(#[from] prometheus::Error),
    #[error("Gathering metrics was aborted: {0}")]
    Gather(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        error!("{self}");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

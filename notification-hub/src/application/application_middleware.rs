use super::ApplicationEnv;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct ApplicationMiddleware {
    pub trace: TraceLayer<SharedClassifier<ServerErrorsAsFailures>>,
    pub body_limit: RequestBodyLimitLayer,
}

pub fn create_middleware(env: &ApplicationEnv) -> ApplicationMiddleware {
    create_middleware_with_body_limit(env.max_http_content_len)
}

pub fn create_middleware_with_body_limit(max_http_content_len: usize) -> ApplicationMiddleware {
    ApplicationMiddleware {
        trace: TraceLayer::new_for_http(),
        body_limit: RequestBodyLimitLayer::new(max_http_content_len),
    }
}

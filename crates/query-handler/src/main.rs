use infrastructure::ServiceContext;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use query_handler::handle_request;
use shared::{init_tracing, ApiGatewayProxyRequest, ApiGatewayProxyResponse, Config};
use tracing::{error, info, Instrument};

/// クエリハンドラーのメイン関数
async fn function_handler(
    event: LambdaEvent<ApiGatewayProxyRequest>,
    services: &ServiceContext,
) -> Result<ApiGatewayProxyResponse, Error> {
    let (payload, context) = event.into_parts();
    let span = tracing::info_span!(
        "query_handler",
        request_id = %context.request_id,
        function_name = %context.env_config.function_name
    );

    let response = handle_request(services, &payload).instrument(span).await;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing()?;

    let config = Config::from_env().map_err(|e| {
        error!("設定読み込みエラー: {}", e);
        Error::from(format!("設定エラー: {e}"))
    })?;

    info!(
        environment = %config.environment,
        store_backend = ?config.store_backend,
        "QueryHandler起動"
    );

    let services = ServiceContext::from_config(&config).await.map_err(|e| {
        error!("サービス初期化エラー: {}", e);
        Error::from(format!("初期化エラー: {e}"))
    })?;
    let services = &services;

    run(service_fn(move |event: LambdaEvent<ApiGatewayProxyRequest>| async move {
        function_handler(event, services).await
    }))
    .await
}

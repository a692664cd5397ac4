use command_handler::handle_request;
use infrastructure::ServiceContext;
use lambda_runtime::{run, service_fn, Context, Error, LambdaEvent};
use shared::{
    init_tracing, trace_lambda_handler, ApiGatewayProxyRequest, ApiGatewayProxyResponse, Config,
};
use tracing::{error, info};

/// コマンドハンドラーのメイン関数
async fn function_handler(
    event: LambdaEvent<ApiGatewayProxyRequest>,
    services: &ServiceContext,
) -> Result<ApiGatewayProxyResponse, Error> {
    let (payload, context) = event.into_parts();

    trace_lambda_handler!(
        "command-handler",
        payload,
        context,
        |payload: ApiGatewayProxyRequest, _context: Context| async move {
            Ok::<_, Error>(handle_request(services, &payload).await)
        }
    )
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
        "CommandHandler起動"
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

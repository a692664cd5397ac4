use domain::{Room, RoomId, Todo};
use infrastructure::ServiceContext;
use shared::{
    error_response, preflight_response, success_response, AppError, ApiGatewayProxyRequest,
    ApiGatewayProxyResponse,
};
use tracing::info;

/// 読み取り系クエリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    GetRoom { room_id: RoomId },
    ListTodos { room_id: RoomId },
}

/// API Gateway イベントを処理してレスポンスを返す
pub async fn handle_request(
    context: &ServiceContext,
    request: &ApiGatewayProxyRequest,
) -> ApiGatewayProxyResponse {
    let request_id = request.request_id();
    info!(
        method = %request.http_method,
        path = %request.path,
        "QueryHandler開始"
    );

    let response = if request.http_method.eq_ignore_ascii_case("OPTIONS") {
        preflight_response(request_id)
    } else {
        let result = match parse_query(request) {
            Ok(query) => execute_query(context, query, request_id).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            e.log(request_id);
            error_response(&e, request_id)
        })
    };

    info!(status = response.status_code, "QueryHandler完了");
    response
}

/// リクエストからクエリをパース
pub fn parse_query(request: &ApiGatewayProxyRequest) -> Result<Query, AppError> {
    let method = request.http_method.to_ascii_uppercase();

    match (method.as_str(), request.route()) {
        ("GET", "room") => {
            let id = request.required_query_param("id", "Missing room ID parameter")?;
            Ok(Query::GetRoom {
                room_id: RoomId::from_string(id.to_string())?,
            })
        }
        ("GET", "todos") => {
            let room = request.required_query_param("room", "Missing room parameter")?;
            Ok(Query::ListTodos {
                room_id: RoomId::from_string(room.to_string())?,
            })
        }
        _ => Err(AppError::NotFound(format!(
            "Route not found: {} {}",
            request.http_method, request.path
        ))),
    }
}

/// クエリを実行
pub async fn execute_query(
    context: &ServiceContext,
    query: Query,
    request_id: Option<&str>,
) -> Result<ApiGatewayProxyResponse, AppError> {
    match query {
        Query::GetRoom { room_id } => {
            let room: Room = context.rooms.get_room(&room_id).await.map_err(|e| {
                if e.is_not_found() {
                    AppError::NotFound("Room not found".to_string())
                } else {
                    AppError::from(e)
                }
            })?;

            Ok(success_response(
                "Room retrieved successfully",
                Some(room),
                request_id,
            ))
        }
        Query::ListTodos { room_id } => {
            let listing = context.todos.list_todos(&room_id).await?;

            info!(
                room_id = %room_id,
                count = listing.todos.len(),
                skipped = listing.skipped,
                "ToDo一覧取得完了"
            );

            // 空でも data は配列で返す
            Ok(success_response::<Vec<Todo>>(
                "Todos retrieved successfully",
                Some(listing.todos),
                request_id,
            ))
        }
    }
}

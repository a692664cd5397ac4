use domain::{
    CreateRoomRequest, CreateTodoRequest, Room, RoomId, Todo, TodoAction, TodoId,
    UpdateTodoRequest,
};
use infrastructure::ServiceContext;
use shared::{
    error_response, preflight_response, success_response, AppError, ApiGatewayProxyRequest,
    ApiGatewayProxyResponse,
};
use tracing::info;

/// 書き込み系コマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateRoom {
        name: String,
    },
    CreateTodo {
        room_id: RoomId,
        text: String,
    },
    UpdateTodo {
        room_id: RoomId,
        todo_id: TodoId,
        text: String,
        completed: bool,
    },
    DeleteTodo {
        room_id: RoomId,
        todo_id: TodoId,
    },
}

/// API Gateway イベントを処理してレスポンスを返す
///
/// エラーはすべて JSON エンベロープのレスポンスに変換される。
pub async fn handle_request(
    context: &ServiceContext,
    request: &ApiGatewayProxyRequest,
) -> ApiGatewayProxyResponse {
    let request_id = request.request_id();
    info!(
        method = %request.http_method,
        path = %request.path,
        "CommandHandler開始"
    );

    let response = if request.http_method.eq_ignore_ascii_case("OPTIONS") {
        preflight_response(request_id)
    } else {
        let result = match parse_command(request) {
            Ok(command) => execute_command(context, command, request_id).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            e.log(request_id);
            error_response(&e, request_id)
        })
    };

    info!(status = response.status_code, "CommandHandler完了");
    response
}

/// メソッドとパスの最終セグメントからコマンドを組み立てる
pub fn parse_command(request: &ApiGatewayProxyRequest) -> Result<Command, AppError> {
    let method = request.http_method.to_ascii_uppercase();

    match (method.as_str(), request.route()) {
        ("POST", "room") => {
            let body: CreateRoomRequest = request.json_body()?;
            body.validate()?;
            Ok(Command::CreateRoom { name: body.name })
        }
        ("POST", "todo") => {
            let room_id = room_param(request)?;
            let body: CreateTodoRequest = request.json_body()?;
            body.validate()?;
            Ok(Command::CreateTodo {
                room_id,
                text: body.text,
            })
        }
        ("PUT", "todo") => {
            let room_id = room_param(request)?;
            let todo_id = todo_id_param(request)?;
            let body: UpdateTodoRequest = request.json_body()?;
            body.validate()?;
            Ok(Command::UpdateTodo {
                room_id,
                todo_id,
                text: body.text,
                completed: body.completed,
            })
        }
        ("DELETE", "todo") => Ok(Command::DeleteTodo {
            room_id: room_param(request)?,
            todo_id: todo_id_param(request)?,
        }),
        _ => Err(AppError::NotFound(format!(
            "Route not found: {} {}",
            request.http_method, request.path
        ))),
    }
}

fn room_param(request: &ApiGatewayProxyRequest) -> Result<RoomId, AppError> {
    let room = request.required_query_param("room", "Missing room parameter")?;
    Ok(RoomId::from_string(room.to_string())?)
}

fn todo_id_param(request: &ApiGatewayProxyRequest) -> Result<TodoId, AppError> {
    let id = request.required_query_param("id", "Missing ID parameter")?;
    Ok(TodoId::from_string(id.to_string())?)
}

/// コマンドを実行
pub async fn execute_command(
    context: &ServiceContext,
    command: Command,
    request_id: Option<&str>,
) -> Result<ApiGatewayProxyResponse, AppError> {
    match command {
        Command::CreateRoom { name } => {
            let room = Room::new(name)?;
            context.rooms.put_room(&room).await?;

            info!(room_id = %room.id, "ルーム作成完了");
            Ok(success_response(
                "Room created successfully",
                Some(room),
                request_id,
            ))
        }
        Command::CreateTodo { room_id, text } => {
            let todo = Todo::new(room_id, text)?;
            context.todos.put_todo(&todo).await?;

            context
                .notifier
                .broadcast_todo_changed(TodoAction::Created, &todo)
                .await;
            context.notifier.broadcast_list_changed(&todo.room_id).await;

            info!(todo_id = %todo.id, room_id = %todo.room_id, "ToDo作成完了");
            Ok(success_response(
                "Todo created successfully",
                Some(todo),
                request_id,
            ))
        }
        Command::UpdateTodo {
            room_id,
            todo_id,
            text,
            completed,
        } => {
            let mut todo = find_todo(context, &room_id, &todo_id).await?;
            todo.apply_update(text, completed)?;
            context.todos.put_todo(&todo).await?;

            context
                .notifier
                .broadcast_todo_changed(TodoAction::Updated, &todo)
                .await;

            info!(todo_id = %todo.id, completed = todo.completed, "ToDo更新完了");
            Ok(success_response(
                "Todo updated successfully",
                Some(todo),
                request_id,
            ))
        }
        Command::DeleteTodo { room_id, todo_id } => {
            // 通知ペイロード用に削除前の内容を取得
            let todo = find_todo(context, &room_id, &todo_id).await?;
            context.todos.delete_todo(&room_id, &todo_id).await?;

            context
                .notifier
                .broadcast_todo_changed(TodoAction::Deleted, &todo)
                .await;
            context.notifier.broadcast_list_changed(&room_id).await;

            info!(todo_id = %todo_id, room_id = %room_id, "ToDo削除完了");
            Ok(success_response::<()>(
                "Todo deleted successfully",
                None,
                request_id,
            ))
        }
    }
}

async fn find_todo(
    context: &ServiceContext,
    room_id: &RoomId,
    todo_id: &TodoId,
) -> Result<Todo, AppError> {
    context
        .todos
        .get_todo(room_id, todo_id)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                AppError::NotFound("Todo not found".to_string())
            } else {
                AppError::from(e)
            }
        })
}

use crate::errors::AppError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// API Gateway プロキシリクエスト構造体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyRequest {
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

/// リクエストコンテキスト構造体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub request_id: Option<String>,
}

impl ApiGatewayProxyRequest {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            http_method: method.to_string(),
            path: path.to_string(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_context = Some(RequestContext {
            request_id: Some(request_id.to_string()),
        });
        self
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.request_id.as_deref())
    }

    /// パスの最終セグメント（ベースパスやステージ名は無視する）
    pub fn route(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }

    /// クエリパラメータを取得（空文字は未指定扱い）
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(key))
            .map(|value| value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// 必須クエリパラメータを取得
    pub fn required_query_param(&self, key: &str, missing_message: &str) -> Result<&str, AppError> {
        self.query_param(key)
            .ok_or_else(|| AppError::Validation(missing_message.to_string()))
    }

    /// リクエストボディを JSON としてパース
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        let bytes = self.body_bytes()?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!(error = %e, "リクエストボディのパースエラー");
            AppError::Deserialization("Invalid JSON".to_string())
        })
    }

    fn body_bytes(&self) -> Result<Vec<u8>, AppError> {
        let body = self.body.as_deref().unwrap_or_default();
        if self.is_base64_encoded {
            STANDARD
                .decode(body)
                .map_err(|_| AppError::Deserialization("Invalid request body".to_string()))
        } else {
            Ok(body.as_bytes().to_vec())
        }
    }
}

/// API Gateway プロキシレスポンス構造体
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ApiGatewayProxyResponse {
    /// ボディの JSON エンベロープを取り出す（テスト・ログ用）
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<ApiResponse<T>, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// 全エンドポイント共通のレスポンスエンベロープ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: &str, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            data: None,
        }
    }
}

/// 全レスポンスに付与するヘッダー
pub fn response_headers(request_id: Option<&str>) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string());
    headers.insert(
        "Access-Control-Allow-Origin".to_string(),
        CORS_ALLOW_ORIGIN.to_string(),
    );
    headers.insert(
        "Access-Control-Allow-Methods".to_string(),
        CORS_ALLOW_METHODS.to_string(),
    );
    headers.insert(
        "Access-Control-Allow-Headers".to_string(),
        CORS_ALLOW_HEADERS.to_string(),
    );
    if let Some(id) = request_id {
        headers.insert("X-Request-ID".to_string(), id.to_string());
    }
    headers
}

/// エンベロープを JSON にしてレスポンスを作成
pub fn json_response<T: Serialize>(
    status_code: u16,
    envelope: &ApiResponse<T>,
    request_id: Option<&str>,
) -> ApiGatewayProxyResponse {
    match serde_json::to_string(envelope) {
        Ok(body) => ApiGatewayProxyResponse {
            status_code,
            headers: response_headers(request_id),
            body,
            is_base64_encoded: false,
        },
        Err(e) => error_response(&AppError::Serialization(e.to_string()), request_id),
    }
}

/// 成功レスポンスを作成
pub fn success_response<T: Serialize>(
    message: &str,
    data: Option<T>,
    request_id: Option<&str>,
) -> ApiGatewayProxyResponse {
    json_response(200, &ApiResponse::ok(message, data), request_id)
}

/// エラーレスポンスを作成
pub fn error_response(error: &AppError, request_id: Option<&str>) -> ApiGatewayProxyResponse {
    let body = serde_json::to_string(&ApiResponse::error(error.client_message()))
        .unwrap_or_else(|_| r#"{"success":false,"message":"Internal server error"}"#.to_string());

    ApiGatewayProxyResponse {
        status_code: error.http_status_code(),
        headers: response_headers(request_id),
        body,
        is_base64_encoded: false,
    }
}

/// CORS プリフライトへの応答
pub fn preflight_response(request_id: Option<&str>) -> ApiGatewayProxyResponse {
    success_response::<()>("OK", None, request_id)
}

use axum::{Extension, Json, extract::State, response::IntoResponse};
use tracing::warn;
use uuid::Uuid;

use mindful_types::api::{ChatMessage, ChatRequest, ChatResponse, Claims};
use mindful_wellness::{classifier, sentiment};

use crate::achievements::{self, ACTIVE_COMMUNICATOR};
use crate::auth::AppState;
use crate::convert;
use crate::error::ApiError;

const CONVERSATION_TITLE: &str = "Mental Health Chat";

pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::validation("Message is required"));
    }

    let reply = classifier::respond(&req.message);
    let mood = sentiment::analyze(&req.message);
    let crisis = classifier::detect_crisis(&req.message);

    if crisis {
        // No escalation happens: the reply itself carries the emergency contacts.
        warn!("Crisis language from user {}; crisis resources returned", claims.sub);
    }

    let transcript = vec![
        ChatMessage {
            role: "user".into(),
            content: req.message,
        },
        ChatMessage {
            role: "assistant".into(),
            content: reply.message.to_string(),
        },
    ];
    let messages_json =
        serde_json::to_string(&transcript).map_err(|e| ApiError::Internal(e.into()))?;

    let uid = claims.sub.to_string();
    state
        .db_call(move |db| {
            db.insert_conversation(
                &Uuid::new_v4().to_string(),
                &uid,
                CONVERSATION_TITLE,
                &messages_json,
                mood.as_str(),
                crisis,
            )
        })
        .await?;

    achievements::grant(&state, claims.sub, &ACTIVE_COMMUNICATOR).await;

    Ok(Json(ChatResponse {
        category: reply.category,
        message: reply.message.to_string(),
        is_crisis: reply.is_crisis,
        suggestions: reply.suggestions.iter().map(|s| s.to_string()).collect(),
    }))
}

pub async fn get_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let rows = state.db_call(move |db| db.get_conversations(&uid)).await?;

    let conversations: Vec<_> = rows.into_iter().map(convert::conversation).collect();
    Ok(Json(conversations))
}

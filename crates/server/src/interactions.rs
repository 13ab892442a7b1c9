use std::convert::Infallible;
use std::task::Poll;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use futures::stream::{self, StreamExt};
use inhouse_core::errors::InterfaceError;
use inhouse_core::pipeline::{FollowupTarget, TeamFormationPipeline};
use inhouse_discord::commands::{CommandReply, CommandRouter};
use inhouse_discord::interactions::{Interaction, InteractionResponse, InteractionType};
use inhouse_discord::signature::{SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

#[derive(Clone)]
pub struct InteractionState {
    verifier: SignatureVerifier,
    commands: CommandRouter,
    pipeline: TeamFormationPipeline,
    inflight: mpsc::Sender<()>,
}

impl InteractionState {
    /// `inflight` is held by every background run; once all clones are dropped
    /// the paired receiver observes that no run is outstanding.
    pub fn new(
        verifier: SignatureVerifier,
        commands: CommandRouter,
        pipeline: TeamFormationPipeline,
        inflight: mpsc::Sender<()>,
    ) -> Self {
        Self { verifier, commands, pipeline, inflight }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn reject(event_name: &'static str, error: InterfaceError) -> Response {
    let status = match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
    };
    warn!(
        event_name = event_name,
        correlation_id = %error.correlation_id(),
        status = status.as_u16(),
        error = %error,
        "interaction rejected"
    );
    (status, Json(ErrorBody { error: error.user_message().to_owned() })).into_response()
}

/// Fires once when the acknowledgment body has been handed to the transport,
/// or when the response is dropped without being written.
struct AckSignal(Option<oneshot::Sender<()>>);

impl AckSignal {
    fn fire(&mut self) {
        if let Some(sent) = self.0.take() {
            let _ = sent.send(());
        }
    }
}

impl Drop for AckSignal {
    fn drop(&mut self) {
        self.fire();
    }
}

fn deferred_ack(sent: oneshot::Sender<()>) -> Response {
    let mut signal = AckSignal(Some(sent));
    let payload = serde_json::to_vec(&InteractionResponse::deferred())
        .unwrap_or_else(|_| br#"{"type":5}"#.to_vec());
    let body = stream::iter([Ok::<_, Infallible>(Bytes::from(payload))]).chain(stream::poll_fn(
        move |_| {
            signal.fire();
            Poll::<Option<Result<Bytes, Infallible>>>::Ready(None)
        },
    ));

    ([(header::CONTENT_TYPE, "application/json")], Body::from_stream(body)).into_response()
}

pub fn router(state: InteractionState) -> Router {
    Router::new().route("/interactions", post(handle_interaction)).with_state(state)
}

pub async fn handle_interaction(
    State(state): State<InteractionState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
    let verified = state.verifier.verify(
        header_value(SIGNATURE_HEADER),
        header_value(TIMESTAMP_HEADER),
        &body,
    );
    if let Err(error) = verified {
        return reject(
            "interaction.signature_rejected",
            InterfaceError::unauthorized(error.to_string(), "unverified"),
        );
    }

    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(interaction) => interaction,
        Err(error) => {
            return reject(
                "interaction.malformed",
                InterfaceError::bad_request(
                    "invalid interaction payload",
                    error.to_string(),
                    "unparsed",
                ),
            );
        }
    };

    match interaction.interaction_type() {
        Some(InteractionType::Ping) => Json(InteractionResponse::pong()).into_response(),
        Some(InteractionType::ApplicationCommand) => dispatch_command(&state, interaction),
        _ => reject(
            "interaction.unknown_type",
            InterfaceError::bad_request(
                "unknown interaction type",
                format!("interaction type {}", interaction.kind),
                interaction.id,
            ),
        ),
    }
}

fn dispatch_command(state: &InteractionState, interaction: Interaction) -> Response {
    let Some(data) = interaction.data.as_ref() else {
        return reject(
            "interaction.unknown_command",
            InterfaceError::bad_request(
                "unknown command",
                "command interaction without data",
                interaction.id,
            ),
        );
    };

    info!(
        event_name = "interaction.command_received",
        correlation_id = %interaction.id,
        command = %data.name,
        option_count = data.options.len(),
        "slash command received"
    );

    match state.commands.route(data) {
        CommandReply::Immediate(response) => Json(response).into_response(),
        CommandReply::Unknown { name } => reject(
            "interaction.unknown_command",
            InterfaceError::bad_request(
                "unknown command",
                format!("command `{name}`"),
                interaction.id.clone(),
            ),
        ),
        CommandReply::MakeTeams(request) => {
            let target = FollowupTarget {
                application_id: interaction.application_id.clone(),
                token: interaction.token.clone(),
            };
            match state.pipeline.admit(interaction.id.clone(), target, request) {
                Ok(run) => {
                    let guard = state.inflight.clone();
                    let (sent, ack) = oneshot::channel();
                    tokio::spawn(async move {
                        let _guard = guard;
                        // No lookup may start before Discord has the deferral.
                        let _ = ack.await;
                        run.run().await;
                    });
                    deferred_ack(sent)
                }
                Err(error) => {
                    reject("interaction.options_rejected", error.into_interface(interaction.id))
                }
            }
        }
    }
}

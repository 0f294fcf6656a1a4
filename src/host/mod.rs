//! Companion lifecycle and request routing.
//!
//! Each page context gets its own companion task owning the document and
//! one `VisibilityEngine`; requests travel over an mpsc channel carrying a
//! oneshot reply sender, so per-page operations are serialized
//! structurally. The host probes liveness with PING and injects the
//! companion on demand: probe, inject, wait for initialization, probe once
//! more, then give up with `InjectionFailed`.

pub mod protocol;

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::engine::{EngineOptions, VisibilityEngine};
use crate::error::{Result, UnveilError};
use crate::page::Document;

pub use protocol::{
    AckResponse, Request, Response, RestoreResponse, RevealResponse, Status,
};

#[derive(Debug, Clone)]
pub struct HostOptions {
    /// Delay after injecting a companion before the confirming probe.
    pub init_delay: Duration,
    /// How long to wait for any single companion response.
    pub request_timeout: Duration,
    pub engine: EngineOptions,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            init_delay: Duration::from_millis(100),
            request_timeout: Duration::from_secs(10),
            engine: EngineOptions::default(),
        }
    }
}

enum Envelope {
    Rpc(Request, oneshot::Sender<Response>),
    Detach(oneshot::Sender<Document>),
}

struct Companion {
    tx: mpsc::UnboundedSender<Envelope>,
}

/// Routes host-surface requests to per-page companions.
pub struct PageHost {
    opts: HostOptions,
    /// Pages opened but not yet injected.
    staged: HashMap<String, Document>,
    companions: HashMap<String, Companion>,
}

impl PageHost {
    pub fn new(opts: HostOptions) -> Self {
        Self {
            opts,
            staged: HashMap::new(),
            companions: HashMap::new(),
        }
    }

    /// Register a page context. The companion is injected lazily on the
    /// first request against it.
    pub fn open_page(&mut self, page_id: &str, doc: Document) {
        self.staged.insert(page_id.to_string(), doc);
    }

    /// Send one request to a page, injecting the companion if the
    /// liveness probe fails.
    pub async fn request(&mut self, page_id: &str, request: Request) -> Result<Response> {
        self.ensure_companion(page_id).await?;
        self.send(page_id, request).await
    }

    /// Tear the companion down (or unstage the page) and hand the
    /// document back.
    pub async fn detach(&mut self, page_id: &str) -> Result<Document> {
        if let Some(doc) = self.staged.remove(page_id) {
            return Ok(doc);
        }
        let companion = self
            .companions
            .remove(page_id)
            .ok_or_else(|| UnveilError::PageNotFound(page_id.to_string()))?;

        let (tx, rx) = oneshot::channel();
        companion
            .tx
            .send(Envelope::Detach(tx))
            .map_err(|_| UnveilError::Other("companion channel closed".to_string()))?;
        tokio::time::timeout(self.opts.request_timeout, rx)
            .await
            .map_err(|_| UnveilError::Timeout(format!("detach from page {}", page_id)))?
            .map_err(|_| UnveilError::Other("companion dropped the page".to_string()))
    }

    async fn ensure_companion(&mut self, page_id: &str) -> Result<()> {
        if self.companions.contains_key(page_id) {
            if self.ping(page_id).await {
                return Ok(());
            }
            tracing::warn!("companion for page {} stopped responding", page_id);
            self.companions.remove(page_id);
        }

        let doc = self
            .staged
            .remove(page_id)
            .ok_or_else(|| UnveilError::PageNotFound(page_id.to_string()))?;

        tracing::debug!("injecting companion into page {}", page_id);
        let companion = spawn_companion(doc, self.opts.engine.clone());
        self.companions.insert(page_id.to_string(), companion);

        // Give the fresh companion a moment to initialize, then confirm.
        tokio::time::sleep(self.opts.init_delay).await;
        if self.ping(page_id).await {
            Ok(())
        } else {
            self.companions.remove(page_id);
            Err(UnveilError::InjectionFailed(page_id.to_string()))
        }
    }

    async fn ping(&mut self, page_id: &str) -> bool {
        matches!(
            self.send(page_id, Request::Ping).await,
            Ok(Response::Status(status)) if status.is_ready()
        )
    }

    async fn send(&mut self, page_id: &str, request: Request) -> Result<Response> {
        let companion = self
            .companions
            .get(page_id)
            .ok_or_else(|| UnveilError::PageNotFound(page_id.to_string()))?;

        let (tx, rx) = oneshot::channel();
        companion
            .tx
            .send(Envelope::Rpc(request, tx))
            .map_err(|_| UnveilError::Other("companion channel closed".to_string()))?;

        tokio::time::timeout(self.opts.request_timeout, rx)
            .await
            .map_err(|_| UnveilError::Timeout(format!("request to page {}", page_id)))?
            .map_err(|_| UnveilError::Other("companion dropped the request".to_string()))
    }
}

fn spawn_companion(doc: Document, opts: EngineOptions) -> Companion {
    let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();

    tokio::spawn(async move {
        let mut engine = VisibilityEngine::new(doc, opts);
        while let Some(envelope) = rx.recv().await {
            match envelope {
                Envelope::Rpc(request, reply) => {
                    let _ = reply.send(dispatch(&mut engine, request));
                }
                Envelope::Detach(reply) => {
                    let _ = reply.send(engine.into_document());
                    return;
                }
            }
        }
    });

    Companion { tx }
}

/// Map one request onto the engine. Engine errors become structured
/// `{success: false, error}` payloads; nothing propagates as Err from
/// here.
pub fn dispatch(engine: &mut VisibilityEngine, request: Request) -> Response {
    match request {
        Request::Ping => Response::Status(Status::ready()),

        Request::DiscoverElements => Response::Discovery(engine.discover()),

        Request::RevealElement { element_id } => match engine.reveal(&element_id) {
            Ok(Some(element)) => Response::Reveal(RevealResponse {
                success: true,
                element: Some(element),
                error: None,
            }),
            Ok(None) => Response::Reveal(RevealResponse {
                success: false,
                element: None,
                error: None,
            }),
            Err(e) => Response::Reveal(RevealResponse {
                success: false,
                element: None,
                error: Some(e.to_string()),
            }),
        },

        Request::RestoreElement { element_id } => match engine.restore(&element_id) {
            Ok(()) => Response::Restore(RestoreResponse {
                success: true,
                error: None,
            }),
            Err(e) => Response::Restore(RestoreResponse {
                success: false,
                error: Some(e.to_string()),
            }),
        },

        Request::RevealAll => Response::RevealSummary(engine.reveal_all()),

        Request::RestoreAll => Response::RestoreSummary(engine.restore_all()),

        Request::HighlightElement { element_id } => match engine.highlight(&element_id) {
            Ok(()) => Response::Ack(AckResponse::ok()),
            Err(e) => Response::Ack(AckResponse::err(e.to_string())),
        },

        Request::UnhighlightAll => {
            engine.unhighlight_all();
            Response::Ack(AckResponse::ok())
        }
    }
}

//! Cooperative event loop around a [`PlaybackController`].
//!
//! One task serializes everything that can touch the controller: the
//! descriptor fetch, surface events, shell commands and timer deadlines.
//! Each wake-up publishes a fresh [`PlayerView`] on a watch channel.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, OptionFuture};
use rustflix_core::{MediaDescriptor, MediaRef};
use rustflix_metadata::{ContentProvider, MetadataError};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::controller::{Intent, PlaybackController};
use crate::surface::{PlaybackSurface, SurfaceSignal};
use crate::view::PlayerView;
use crate::SessionError;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Intent(Intent),
    /// Show different content. Discards the current mount.
    Navigate(MediaRef),
}

type Fetch = BoxFuture<'static, (Uuid, Result<Option<MediaDescriptor>, MetadataError>)>;

fn fetch_descriptor(provider: Arc<dyn ContentProvider>, mount_id: Uuid, target: MediaRef) -> Fetch {
    async move {
        let result = provider.fetch_media(&target.id, target.kind).await;
        (mount_id, result)
    }
    .boxed()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Drive `controller` until the command channel closes, then tear down and
/// hand the controller back.
pub async fn run_session<S: PlaybackSurface>(
    mut controller: PlaybackController<S>,
    mut events: mpsc::UnboundedReceiver<SurfaceSignal>,
    provider: Arc<dyn ContentProvider>,
    initial: MediaRef,
    mut commands: mpsc::Receiver<SessionCommand>,
    views: watch::Sender<Option<PlayerView>>,
) -> PlaybackController<S> {
    let mount_id = controller.mount(initial.clone(), None);
    let mut fetch: Option<Fetch> = Some(fetch_descriptor(provider.clone(), mount_id, initial));
    publish(&views, &controller);

    loop {
        let deadline = controller.next_deadline();

        tokio::select! {
            Some((mount_id, result)) = OptionFuture::from(fetch.as_mut()), if fetch.is_some() => {
                fetch = None;
                match result {
                    Ok(Some(descriptor)) => {
                        controller.descriptor_loaded(mount_id, descriptor);
                    }
                    Ok(None) => warn!(%mount_id, "content provider has no such title, staying in loading state"),
                    Err(e) => warn!(%mount_id, error = %e, "descriptor fetch failed, staying in loading state"),
                }
            }
            Some(signal) = events.recv() => {
                controller.handle_surface_event(signal);
            }
            command = commands.recv() => match command {
                Some(SessionCommand::Intent(intent)) => {
                    debug!(?intent, "shell intent");
                    controller.apply_intent(intent);
                }
                Some(SessionCommand::Navigate(target)) => {
                    let mount_id = controller.mount(target.clone(), None);
                    fetch = Some(fetch_descriptor(provider.clone(), mount_id, target));
                }
                None => break,
            },
            _ = sleep_until(deadline), if deadline.is_some() => {
                controller.fire_due_timers(Instant::now());
            }
        }

        publish(&views, &controller);
    }

    controller.teardown();
    publish(&views, &controller);
    info!("player session closed");
    controller
}

fn publish<S: PlaybackSurface>(views: &watch::Sender<Option<PlayerView>>, controller: &PlaybackController<S>) {
    let next = controller.view();
    views.send_if_modified(|current| {
        if *current != next {
            *current = next;
            true
        } else {
            false
        }
    });
}

/// Handle to a session running on its own task.
pub struct PlayerSession<S> {
    commands: mpsc::Sender<SessionCommand>,
    views: watch::Receiver<Option<PlayerView>>,
    task: JoinHandle<PlaybackController<S>>,
}

impl<S: PlaybackSurface + 'static> PlayerSession<S> {
    pub fn spawn(
        controller: PlaybackController<S>,
        events: mpsc::UnboundedReceiver<SurfaceSignal>,
        provider: Arc<dyn ContentProvider>,
        initial: MediaRef,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel(64);
        let (views_tx, views_rx) = watch::channel(None);
        let task = tokio::spawn(run_session(
            controller,
            events,
            provider,
            initial,
            commands_rx,
            views_tx,
        ));
        Self {
            commands: commands_tx,
            views: views_rx,
            task,
        }
    }

    pub async fn send(&self, intent: Intent) -> Result<(), SessionError> {
        self.command(SessionCommand::Intent(intent)).await
    }

    pub async fn navigate(&self, target: MediaRef) -> Result<(), SessionError> {
        self.command(SessionCommand::Navigate(target)).await
    }

    pub async fn command(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }

    pub fn views(&self) -> watch::Receiver<Option<PlayerView>> {
        self.views.clone()
    }

    /// Close the command channel and wait for the loop to finish.
    pub async fn shutdown(self) -> Option<PlaybackController<S>> {
        drop(self.commands);
        match self.task.await {
            Ok(controller) => Some(controller),
            Err(e) => {
                warn!(error = %e, "player session task failed");
                None
            }
        }
    }
}

//! System web-view runner: a tao window holding wry views.
//!
//! One chrome view draws the toolbar and tab strip; each tab gets its own
//! content view below it. Content views of a session share one
//! `WebContext` rooted at the profile's storage directory.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use anyhow::{Context, Result};
use common::{ShellError, ShellResult};
use parking_lot::Mutex;
use profiles::{CleanupReport, ProfileStore};
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use tao::platform::run_return::EventLoopExtRunReturn;
use tao::window::{Window, WindowBuilder};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use ui::{Browser, BrowserWindow, ProfileChoice};
use url::Url;
use web_engine::{
    EngineEvent, EngineFactory, NavigationHistory, NavigationState, StorageConfig, WebEngine,
};
use wry::dpi::{LogicalPosition, LogicalSize};
use wry::{PageLoadEvent, Rect, WebContext, WebView, WebViewBuilder};

use crate::chrome::{ChromeCommand, ChromeState, CHROME_HEIGHT, CHROME_HTML};
use crate::config::ShellConfig;
use crate::runner::resolve_start_url;

/// Events delivered to the window's event loop.
#[derive(Debug)]
pub enum UserEvent {
    /// IPC message from the chrome view.
    Chrome(String),
    /// A content view queued notifications.
    ViewChanged(u64),
}

/// Notifications and history shared with a view's callbacks.
#[derive(Default)]
struct ViewState {
    history: NavigationHistory,
    events: VecDeque<EngineEvent>,
    title: String,
}

/// Content view backed by the system web view.
///
/// The engine exposes no back/forward query, so the list of committed URLs
/// is tracked here.
pub struct WryEngine {
    id: u64,
    webview: Rc<WebView>,
    state: Arc<Mutex<ViewState>>,
}

impl WebEngine for WryEngine {
    fn load(&mut self, url: &str) -> ShellResult<()> {
        let url = Url::parse(url)?;
        debug!(view = self.id, url = %url, "load");
        self.webview
            .load_url(url.as_str())
            .map_err(|e| ShellError::engine(e.to_string()))
    }

    fn go_back(&mut self) {
        let moved = self.state.lock().history.go_back().is_some();
        if moved {
            self.run_script("history.back()");
        }
    }

    fn go_forward(&mut self) {
        let moved = self.state.lock().history.go_forward().is_some();
        if moved {
            self.run_script("history.forward()");
        }
    }

    fn reload(&mut self) {
        self.run_script("location.reload()");
    }

    fn navigation_state(&self) -> NavigationState {
        let state = self.state.lock();
        NavigationState {
            can_go_back: state.history.can_go_back(),
            can_go_forward: state.history.can_go_forward(),
        }
    }

    fn current_url(&self) -> Option<String> {
        self.state.lock().history.current().cloned()
    }

    fn current_title(&self) -> String {
        self.state.lock().title.clone()
    }

    fn take_events(&mut self) -> Vec<EngineEvent> {
        self.state.lock().events.drain(..).collect()
    }

    fn set_visible(&mut self, visible: bool) {
        if let Err(e) = self.webview.set_visible(visible) {
            warn!(view = self.id, error = %e, "failed to change view visibility");
        }
    }
}

impl WryEngine {
    fn run_script(&self, script: &str) {
        if let Err(e) = self.webview.evaluate_script(script) {
            warn!(view = self.id, error = %e, "script failed");
        }
    }
}

/// Creates content views inside one window.
pub struct WryEngineFactory {
    window: Rc<Window>,
    proxy: EventLoopProxy<UserEvent>,
    /// Created with the first view, from that view's storage.
    context: RefCell<Option<WebContext>>,
    views: RefCell<Vec<Weak<WebView>>>,
}

impl WryEngineFactory {
    pub fn new(window: Rc<Window>, proxy: EventLoopProxy<UserEvent>) -> Self {
        Self {
            window,
            proxy,
            context: RefCell::new(None),
            views: RefCell::new(Vec::new()),
        }
    }

    /// Fit every live content view to the window.
    pub fn layout(&self) {
        let (width, height) = logical_size(&self.window);
        let bounds = content_rect(width, height);

        self.views.borrow_mut().retain(|view| match view.upgrade() {
            Some(view) => {
                if let Err(e) = view.set_bounds(bounds) {
                    warn!(error = %e, "failed to resize view");
                }
                true
            }
            None => false,
        });
    }
}

impl EngineFactory for WryEngineFactory {
    fn create(&self, view_id: u64, storage: &StorageConfig) -> ShellResult<Box<dyn WebEngine>> {
        let state = Arc::new(Mutex::new(ViewState::default()));
        let (width, height) = logical_size(&self.window);

        let mut context = self.context.borrow_mut();
        let context = context.get_or_insert_with(|| {
            info!(dir = %storage.data_dir().display(), "engine storage");
            WebContext::new(Some(storage.data_dir().to_path_buf()))
        });

        let load_state = state.clone();
        let load_proxy = self.proxy.clone();
        let title_state = state.clone();
        let title_proxy = self.proxy.clone();

        let webview = WebViewBuilder::with_web_context(context)
            .with_bounds(content_rect(width, height))
            .with_incognito(storage.off_the_record)
            .with_on_page_load_handler(move |event, url| {
                {
                    let mut state = load_state.lock();
                    match event {
                        PageLoadEvent::Started => {
                            state.history.record(&url);
                            state.events.push_back(EngineEvent::LoadStarted);
                            state.events.push_back(EngineEvent::UrlChanged(url));
                        }
                        PageLoadEvent::Finished => {
                            state.events.push_back(EngineEvent::LoadProgress(100));
                            state.events.push_back(EngineEvent::LoadFinished { success: true });
                        }
                    }
                }
                let _ = load_proxy.send_event(UserEvent::ViewChanged(view_id));
            })
            .with_document_title_changed_handler(move |title| {
                {
                    let mut state = title_state.lock();
                    state.title = title.clone();
                    state.events.push_back(EngineEvent::TitleChanged(title));
                }
                let _ = title_proxy.send_event(UserEvent::ViewChanged(view_id));
            })
            .build_as_child(&*self.window)
            .map_err(|e| ShellError::engine(e.to_string()))?;

        let webview = Rc::new(webview);
        self.views.borrow_mut().push(Rc::downgrade(&webview));

        Ok(Box::new(WryEngine {
            id: view_id,
            webview,
            state,
        }))
    }
}

fn logical_size(window: &Window) -> (f64, f64) {
    let size = window.inner_size().to_logical::<f64>(window.scale_factor());
    (size.width, size.height)
}

fn chrome_rect(width: f64) -> Rect {
    Rect {
        position: LogicalPosition::new(0.0, 0.0).into(),
        size: LogicalSize::new(width, CHROME_HEIGHT).into(),
    }
}

fn content_rect(width: f64, height: f64) -> Rect {
    Rect {
        position: LogicalPosition::new(0.0, CHROME_HEIGHT).into(),
        size: LogicalSize::new(width, (height - CHROME_HEIGHT).max(0.0)).into(),
    }
}

fn build_chrome(window: &Window, proxy: EventLoopProxy<UserEvent>) -> Result<WebView> {
    let (width, _) = logical_size(window);
    WebViewBuilder::new()
        .with_html(CHROME_HTML)
        .with_incognito(true)
        .with_bounds(chrome_rect(width))
        .with_ipc_handler(move |request: wry::http::Request<String>| {
            let _ = proxy.send_event(UserEvent::Chrome(request.body().clone()));
        })
        .build_as_child(window)
        .context("creating chrome view")
}

fn sync_chrome(window: &Window, chrome: &WebView, state: &BrowserWindow) {
    window.set_title(&state.window_title());
    if let Err(e) = chrome.evaluate_script(&ChromeState::from_window(state).to_script()) {
        warn!(error = %e, "failed to redraw chrome");
    }
}

/// Open a window for the chosen profile and run until it is closed.
///
/// Every view is gone by the time this returns. Returns the guest cleanup
/// task for guest sessions.
pub fn run_webview(
    config: &ShellConfig,
    store: &ProfileStore,
    choice: &ProfileChoice,
    start_url: Option<&str>,
) -> Result<Option<JoinHandle<CleanupReport>>> {
    let mut event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let settings = config.settings();
    let window = Rc::new(
        WindowBuilder::new()
            .with_title(settings.app_name.as_str())
            .with_inner_size(tao::dpi::LogicalSize::new(
                config.width as f64,
                config.height as f64,
            ))
            .build(&event_loop)
            .context("creating window")?,
    );

    let factory = Rc::new(WryEngineFactory::new(window.clone(), proxy.clone()));
    let start_url = resolve_start_url(start_url, &settings.search_engine);
    let mut browser = Browser::launch(
        store,
        choice,
        Box::new(factory.clone()),
        settings,
        &config.guest_parent(),
        start_url.as_deref(),
    )
    .context("launching session")?;

    let chrome = build_chrome(&window, proxy)?;
    sync_chrome(&window, &chrome, browser.window());

    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => *control_flow = ControlFlow::Exit,
            Event::WindowEvent {
                event: WindowEvent::Resized(_),
                ..
            } => {
                let (width, _) = logical_size(&window);
                if let Err(e) = chrome.set_bounds(chrome_rect(width)) {
                    warn!(error = %e, "failed to resize chrome");
                }
                factory.layout();
            }
            Event::UserEvent(UserEvent::Chrome(message)) => {
                match ChromeCommand::parse(&message) {
                    Some(command) => {
                        debug!(?command, "chrome command");
                        if let Err(e) = command.apply(browser.window_mut()) {
                            warn!(error = %e, "chrome command failed");
                        }
                    }
                    None => debug!(message = %message, "ignoring chrome message"),
                }
                browser.window_mut().pump_events();
                sync_chrome(&window, &chrome, browser.window());

                if browser.window().tab_count() == 0 {
                    *control_flow = ControlFlow::Exit;
                }
            }
            Event::UserEvent(UserEvent::ViewChanged(view)) => {
                let handled = browser.window_mut().pump_events();
                debug!(view, events = handled, "view notifications");
                sync_chrome(&window, &chrome, browser.window());
            }
            _ => {}
        }
    });

    // Views and the shared WebContext must be gone before guest cleanup.
    drop(chrome);
    drop(factory);
    let cleanup = browser.shutdown(config.cleanup_policy())?;
    info!("window closed");
    Ok(cleanup)
}

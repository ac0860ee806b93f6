//! Toolbar and tab strip drawn in a web view.
//!
//! The chrome page posts plain-text commands over IPC and is redrawn from a
//! JSON snapshot of the window state.

use common::ShellResult;
use serde::Serialize;
use ui::{BrowserWindow, NavigationAction};

/// Height of the chrome strip in logical pixels.
pub const CHROME_HEIGHT: f64 = 76.0;

/// Command posted by the chrome page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChromeCommand {
    /// Address bar submitted.
    Navigate(String),
    /// A toolbar button.
    Action(NavigationAction),
    /// Tab clicked.
    SelectTab(usize),
    /// Tab close button.
    CloseTab(usize),
    /// Double click on the strip; `None` when it hit empty space.
    StripDoubleClick(Option<usize>),
    /// Address field gained focus.
    FocusAddress,
    /// Address edit abandoned with Escape.
    RevertAddress,
    /// Page finished loading and wants a snapshot.
    Ready,
}

impl ChromeCommand {
    /// Parse an IPC message.
    pub fn parse(message: &str) -> Option<Self> {
        let (verb, arg) = match message.split_once(':') {
            Some((verb, arg)) => (verb, Some(arg)),
            None => (message, None),
        };

        let index = || arg.and_then(|a| a.trim().parse::<usize>().ok());
        match (verb, arg) {
            ("navigate", Some(text)) => Some(ChromeCommand::Navigate(text.to_string())),
            ("back", None) => Some(ChromeCommand::Action(NavigationAction::Back)),
            ("forward", None) => Some(ChromeCommand::Action(NavigationAction::Forward)),
            ("reload", None) => Some(ChromeCommand::Action(NavigationAction::Reload)),
            ("home", None) => Some(ChromeCommand::Action(NavigationAction::Home)),
            ("new-tab", None) => Some(ChromeCommand::Action(NavigationAction::NewTab)),
            ("select", Some(_)) => index().map(ChromeCommand::SelectTab),
            ("close", Some(_)) => index().map(ChromeCommand::CloseTab),
            ("dblclick", None) => Some(ChromeCommand::StripDoubleClick(None)),
            ("dblclick", Some(_)) => index().map(|i| ChromeCommand::StripDoubleClick(Some(i))),
            ("focus", None) => Some(ChromeCommand::FocusAddress),
            ("revert", None) => Some(ChromeCommand::RevertAddress),
            ("ready", None) => Some(ChromeCommand::Ready),
            _ => None,
        }
    }

    /// Apply the command to the window.
    pub fn apply(self, window: &mut BrowserWindow) -> ShellResult<()> {
        match self {
            ChromeCommand::Navigate(text) => {
                window.submit_address(&text);
            }
            ChromeCommand::Action(action) => {
                window.perform(action)?;
            }
            ChromeCommand::SelectTab(index) => window.set_active_index(index),
            ChromeCommand::CloseTab(index) => {
                if let Some(id) = window.tab_bar().id_at(index) {
                    window.close_tab(id)?;
                }
            }
            ChromeCommand::StripDoubleClick(index) => {
                window.on_tab_bar_double_click(index)?;
            }
            ChromeCommand::FocusAddress => window.focus_address_bar(),
            ChromeCommand::RevertAddress => window.revert_address(),
            ChromeCommand::Ready => {}
        }
        Ok(())
    }
}

/// Tab as drawn in the strip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChromeTab {
    pub title: String,
    pub loading: bool,
    pub active: bool,
}

/// Snapshot the chrome page draws.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChromeState {
    pub tabs: Vec<ChromeTab>,
    pub url: String,
    pub back: bool,
    pub forward: bool,
    pub reload: bool,
    pub home: bool,
    pub loading: bool,
    pub profile: String,
}

impl ChromeState {
    /// Snapshot the window.
    pub fn from_window(window: &BrowserWindow) -> Self {
        let active = window.tab_bar().active_index();
        let nav = window.navigation_bar();

        Self {
            tabs: window
                .tab_bar()
                .tabs()
                .iter()
                .enumerate()
                .map(|(i, entry)| ChromeTab {
                    title: entry.title.clone(),
                    loading: entry.loading,
                    active: active == Some(i),
                })
                .collect(),
            url: window.address_bar().input().to_string(),
            back: nav.is_enabled(NavigationAction::Back),
            forward: nav.is_enabled(NavigationAction::Forward),
            reload: nav.is_enabled(NavigationAction::Reload),
            home: nav.is_enabled(NavigationAction::Home),
            loading: nav.is_loading(),
            profile: window.window_title(),
        }
    }

    /// Script that redraws the chrome page.
    pub fn to_script(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "null".to_string());
        format!("window.wayfarer && window.wayfarer.render({});", json)
    }
}

/// Chrome page markup.
pub const CHROME_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  body { margin: 0; font: 13px system-ui, sans-serif; background: #e8e8ec; user-select: none; }
  #strip { display: flex; height: 34px; align-items: flex-end; padding: 0 6px; }
  .tab { display: flex; align-items: center; max-width: 200px; min-width: 60px; height: 28px;
         padding: 0 8px; margin-right: 2px; background: #d4d4da; border-radius: 6px 6px 0 0; }
  .tab.active { background: #fafafa; }
  .tab .title { flex: 1; overflow: hidden; white-space: nowrap; text-overflow: ellipsis; }
  .tab .close { margin-left: 6px; border: 0; background: none; cursor: pointer; }
  #bar { display: flex; gap: 4px; height: 42px; align-items: center; padding: 0 6px; background: #fafafa; }
  #bar button { width: 30px; height: 28px; }
  #address { flex: 1; height: 26px; padding: 0 8px; }
</style>
</head>
<body>
<div id="strip"></div>
<div id="bar">
  <button id="back" title="Back">&#8592;</button>
  <button id="forward" title="Forward">&#8594;</button>
  <button id="reload" title="Reload">&#8635;</button>
  <button id="home" title="Home">&#8962;</button>
  <input id="address" spellcheck="false">
  <button id="new-tab" title="New Tab">+</button>
</div>
<script>
  const post = (msg) => window.ipc.postMessage(msg);
  const strip = document.getElementById('strip');
  const address = document.getElementById('address');
  for (const id of ['back', 'forward', 'reload', 'home', 'new-tab']) {
    document.getElementById(id).addEventListener('click', () => post(id));
  }
  address.addEventListener('focus', () => post('focus'));
  address.addEventListener('keydown', (e) => {
    if (e.key === 'Enter') { post('navigate:' + address.value); address.blur(); }
    if (e.key === 'Escape') { post('revert'); address.blur(); }
  });
  strip.addEventListener('dblclick', (e) => {
    if (e.target === strip) post('dblclick');
  });
  window.wayfarer = {
    render(state) {
      strip.textContent = '';
      state.tabs.forEach((tab, i) => {
        const el = document.createElement('div');
        el.className = 'tab' + (tab.active ? ' active' : '');
        const title = document.createElement('span');
        title.className = 'title';
        title.textContent = (tab.loading ? '⌛ ' : '') + tab.title;
        const close = document.createElement('button');
        close.className = 'close';
        close.textContent = '×';
        close.addEventListener('click', (e) => { e.stopPropagation(); post('close:' + i); });
        el.addEventListener('click', () => post('select:' + i));
        el.addEventListener('dblclick', (e) => { e.stopPropagation(); post('dblclick:' + i); });
        el.append(title, close);
        strip.append(el);
      });
      for (const id of ['back', 'forward', 'reload', 'home']) {
        document.getElementById(id).disabled = !state[id];
      }
      if (document.activeElement !== address) address.value = state.url;
      document.title = state.profile;
    }
  };
  post('ready');
</script>
</body>
</html>
"#;

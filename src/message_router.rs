//! Message router for the Archy background surface.
//!
//! One long-lived dispatcher multiplexing the named request types the
//! sidebar, new-tab page, and overlay send over the extension's internal
//! messaging channel. Each handler proxies the native APIs (or the app
//! context) and resolves to a JSON value; errors come back as strings and
//! feed the failure guard, which escalates to an extension reload when
//! they arrive too fast.
//!
//! Extracted from `message_server.rs` so it can be unit-tested
//! independently of the NDJSON transport.

use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::app::App;
use crate::browser::api::{BrowserRuntime, BrowserTabs, BrowserWindows, WindowKind};
use crate::managers::section_manager::collect_bookmarks;
use crate::services::recovery::GuardAction;
use crate::types::search::{SearchResult, SearchResultKind};

/// URL prefixes hidden from every surface.
const INTERNAL_URL_PREFIXES: &[&str] = &["chrome://", "chrome-extension://", "about:"];

/// Dispatches one named message. On failure the guard is fed; overflow
/// raises a notification and asks the runtime to reload the extension.
pub async fn handle_message<B>(
    app: &Mutex<App>,
    browser: &B,
    msg_type: &str,
    params: &Value,
) -> Result<Value, String>
where
    B: BrowserTabs + BrowserWindows + BrowserRuntime,
{
    let result = dispatch(app, browser, msg_type, params).await;
    if let Err(e) = &result {
        log::warn!("message {} failed: {}", msg_type, e);
        let action = app.lock().await.failure_guard.record_failure();
        if action == GuardAction::Reload {
            log::error!("error threshold exceeded, requesting extension reload");
            let _ = browser
                .notify("Archy", "Too many errors — reloading the extension")
                .await;
            let _ = browser.reload_extension().await;
        }
    }
    result
}

async fn dispatch<B>(
    app: &Mutex<App>,
    browser: &B,
    msg_type: &str,
    params: &Value,
) -> Result<Value, String>
where
    B: BrowserTabs + BrowserWindows + BrowserRuntime,
{
    match msg_type {
        "PING" => Ok(json!({"pong": true})),

        // ─── Tab queries ───
        "GET_ALL_TABS" => {
            let windows = browser.all_windows().await.map_err(|e| e.to_string())?;
            let normal: Vec<_> = windows
                .into_iter()
                .filter(|w| w.kind == WindowKind::Normal)
                .collect();
            serde_json::to_value(normal).map_err(|e| e.to_string())
        }
        "GET_TABS_FOR_OVERLAY" => {
            let tabs = browser.query_tabs().await.map_err(|e| e.to_string())?;
            let visible: Vec<_> = tabs
                .into_iter()
                .filter(|t| !is_internal_url(&t.url))
                .collect();
            Ok(json!({ "tabs": visible }))
        }
        "SEARCH_ALL" => {
            let query = params
                .get("query")
                .and_then(|v| v.as_str())
                .ok_or("missing query")?
                .to_lowercase();
            let tabs = browser.query_tabs().await.map_err(|e| e.to_string())?;
            let mut results: Vec<SearchResult> = tabs
                .iter()
                .filter(|t| !is_internal_url(&t.url) && matches_query(&t.title, &t.url, &query))
                .map(|t| SearchResult {
                    id: format!("tab-{}", t.id),
                    title: t.title.clone(),
                    url: t.url.clone(),
                    favicon: t.favicon.clone(),
                    kind: SearchResultKind::Tab,
                    tab_id: Some(t.id),
                    window_id: Some(t.window_id),
                })
                .collect();

            let sections = {
                let app = app.lock().await;
                app.store.load_sections().map_err(|e| e.to_string())?
            };
            let open_urls: Vec<&str> = tabs.iter().map(|t| t.url.as_str()).collect();
            results.extend(
                collect_bookmarks(&sections)
                    .into_iter()
                    .filter(|b| matches_query(&b.title, &b.url, &query))
                    .filter(|b| !open_urls.contains(&b.url.as_str()))
                    .map(|b| SearchResult {
                        id: b.id,
                        title: b.title,
                        url: b.url,
                        favicon: b.favicon,
                        kind: SearchResultKind::Bookmark,
                        tab_id: None,
                        window_id: None,
                    }),
            );
            serde_json::to_value(results).map_err(|e| e.to_string())
        }

        // ─── Tab commands ───
        "SWITCH_TO_TAB" => {
            let tab_id = params
                .get("tabId")
                .and_then(|v| v.as_i64())
                .ok_or("missing tabId")?;
            browser.activate_tab(tab_id).await.map_err(|e| e.to_string())?;
            if let Some(window_id) = params.get("windowId").and_then(|v| v.as_u64()) {
                browser
                    .focus_window(window_id)
                    .await
                    .map_err(|e| e.to_string())?;
            }
            Ok(json!({"success": true}))
        }
        "CLOSE_TAB" => {
            let tab_id = params
                .get("tabId")
                .and_then(|v| v.as_i64())
                .ok_or("missing tabId")?;
            browser.close_tab(tab_id).await.map_err(|e| e.to_string())?;
            Ok(json!({"success": true}))
        }
        "CREATE_NEW_TAB" => {
            let window_id = params.get("windowId").and_then(|v| v.as_u64());
            let url = params.get("url").and_then(|v| v.as_str());
            let tab = browser
                .create_tab(window_id, url, true, false)
                .await
                .map_err(|e| e.to_string())?;
            Ok(json!({"success": true, "tab": tab}))
        }
        "CREATE_NEW_WINDOW" => {
            let url = params.get("url").and_then(|v| v.as_str());
            let window = browser.create_window(url).await.map_err(|e| e.to_string())?;
            Ok(json!({"success": true, "window": window}))
        }
        "MOVE_TAB_TO_NEW_WINDOW" => {
            let tab_id = params
                .get("tabId")
                .and_then(|v| v.as_i64())
                .ok_or("missing tabId")?;
            let window = browser
                .create_window_with_tab(tab_id)
                .await
                .map_err(|e| e.to_string())?;
            Ok(json!({"success": true, "window": window}))
        }
        "OPEN_SEARCH_RESULT" => {
            let result = params.get("result").ok_or("missing result")?;
            let new_window = params
                .get("newWindow")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if let Some(tab_id) = result.get("tab_id").and_then(|v| v.as_i64()) {
                // A live tab: switch instead of reopening.
                match browser.get_tab(tab_id).await {
                    Ok(tab) => {
                        browser.activate_tab(tab_id).await.map_err(|e| e.to_string())?;
                        browser
                            .focus_window(tab.window_id)
                            .await
                            .map_err(|e| e.to_string())?;
                        return Ok(json!({"success": true}));
                    }
                    Err(_) => log::debug!("search-result tab {} is gone, reopening", tab_id),
                }
            }
            let url = result
                .get("url")
                .and_then(|v| v.as_str())
                .ok_or("missing result url")?;
            if new_window {
                browser.create_window(Some(url)).await.map_err(|e| e.to_string())?;
            } else {
                browser
                    .create_tab(None, Some(url), true, false)
                    .await
                    .map_err(|e| e.to_string())?;
            }
            Ok(json!({"success": true}))
        }

        // ─── Side panel / overlay state ───
        "SIDEPANEL_OPENED" => {
            let window_id = params
                .get("windowId")
                .and_then(|v| v.as_u64())
                .ok_or("missing windowId")?;
            app.lock().await.set_side_panel_open(window_id, true);
            Ok(json!({"success": true}))
        }
        "SIDEPANEL_CLOSED" => {
            let window_id = params
                .get("windowId")
                .and_then(|v| v.as_u64())
                .ok_or("missing windowId")?;
            app.lock().await.set_side_panel_open(window_id, false);
            Ok(json!({"success": true}))
        }
        "PING_SIDEPANEL" => Ok(json!({"alive": true})),
        "TOGGLE_OVERLAY" => {
            let visible = app.lock().await.toggle_overlay();
            Ok(json!({"visible": visible}))
        }

        _ => Err(format!("unknown message type: {}", msg_type)),
    }
}

fn matches_query(title: &str, url: &str, query: &str) -> bool {
    title.to_lowercase().contains(query) || url.to_lowercase().contains(query)
}

fn is_internal_url(url: &str) -> bool {
    INTERNAL_URL_PREFIXES.iter().any(|p| url.starts_with(p))
}

//! Purpose: Top-level app shell: active view, search state, and event routing.
//! Exports: `AppShell`, `SearchState`.
//! Role: Wires forms to views; consumes upward `AppEvent`s from child controllers.
//! Invariants: Search loading is cleared on every exit path.
//! Invariants: An upload success switches to Manage and bumps the refresh counter once.

use super::{
    AppEvent, DocumentManagement, DocumentUpload, ResultList, SearchBar, View,
};
use crate::api::{DEFAULT_SEARCH_LIMIT, DocumentApi, SearchResult};
use std::fmt::Write as _;
use tracing::debug;

#[derive(Debug, Default)]
pub struct SearchState {
    pub results: Vec<SearchResult>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct AppShell {
    active: View,
    refresh_counter: u64,
    pub search_bar: SearchBar,
    pub search: SearchState,
    pub result_list: ResultList,
    pub upload: DocumentUpload,
    pub management: DocumentManagement,
}

impl AppShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> View {
        self.active
    }

    pub fn refresh_counter(&self) -> u64 {
        self.refresh_counter
    }

    pub fn switch_to(&mut self, view: View) {
        if view == View::Manage && self.active != View::Manage {
            self.management.remount();
        }
        debug!(from = ?self.active, to = ?view, "switch view");
        self.active = view;
    }

    pub fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Navigate(view) => self.switch_to(view),
            AppEvent::Uploaded(document) => {
                debug!(id = %document.id, "upload observed by shell");
                self.switch_to(View::Manage);
                self.refresh_counter += 1;
            }
        }
    }

    /// Lets the visible view react to state it observes (the manage grid
    /// reloads on mount and on refresh-counter changes).
    pub async fn sync<A: DocumentApi>(&mut self, api: &A) {
        if self.active == View::Manage {
            self.management
                .observe_refresh(self.refresh_counter, api)
                .await;
        }
    }

    /// Submits the search bar's current text.
    pub async fn run_search<A: DocumentApi>(&mut self, api: &A) {
        self.search.error = None;
        self.search.is_loading = true;

        let Some(query) = self.search_bar.submit() else {
            self.search.is_loading = false;
            return;
        };

        let outcome = api.search(&query, DEFAULT_SEARCH_LIMIT).await;
        self.search.is_loading = false;
        match outcome {
            Ok(results) => self.search.results = results,
            Err(err) => {
                self.search.error = Some(err.detail());
                self.search.results.clear();
            }
        }
    }

    pub async fn submit_upload<A: DocumentApi>(&mut self, api: &A) {
        if let Some(event) = self.upload.submit(api).await {
            self.handle(event);
            self.sync(api).await;
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let tabs = [View::Search, View::Upload, View::Manage]
            .iter()
            .map(|view| {
                if *view == self.active {
                    format!("[{}]", view.label())
                } else {
                    view.label().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" | ");
        let _ = writeln!(out, "{tabs}");
        out.push('\n');
        match self.active {
            View::Search => out.push_str(&self.render_search()),
            View::Upload => out.push_str(&self.upload.render()),
            View::Manage => out.push_str(&self.management.render()),
        }
        out
    }

    fn render_search(&self) -> String {
        if self.search.is_loading {
            return "Loading...".to_string();
        }
        if let Some(error) = &self.search.error {
            return format!("Error: {error}");
        }
        self.result_list.render(&self.search.results)
    }
}

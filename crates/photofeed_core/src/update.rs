use crate::route::resolve_location;
use crate::{Effect, FeedState, Msg, Route};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: FeedState, msg: Msg) -> (FeedState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlChanged(location) => {
            let route = resolve_location(&location, &state.config().default_site);
            if &route == state.route() {
                return (state, Vec::new());
            }
            enter_route(&mut state, route)
        }
        Msg::SiteSelected(site) => {
            let site = site.trim();
            let route = if site.is_empty() {
                Route::NoSiteGiven
            } else {
                Route::Site(site.to_string())
            };
            enter_route(&mut state, route)
        }
        Msg::NextPageRequested => state.request_next_page().into_iter().collect(),
        Msg::Scrolled(position) => {
            if position.is_near_bottom() {
                state.request_next_page().into_iter().collect()
            } else {
                Vec::new()
            }
        }
        Msg::PageLoaded { request_id, result } => {
            state.complete(request_id, result);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn enter_route(state: &mut FeedState, route: Route) -> Vec<Effect> {
    match route {
        Route::Site(site) => vec![state.start(site)],
        Route::Boot | Route::NoSiteGiven | Route::SiteNotFound => {
            state.stop_at(route);
            Vec::new()
        }
    }
}

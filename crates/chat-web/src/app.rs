//! Root component and routes

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::pages::{ChatPage, HomePage};

#[component]
pub fn App() -> impl IntoView {
    view! {
        <Router>
            <nav class="topbar">
                <A href="/">"crypto-chat"</A>
                <A href="/chat">"Chat"</A>
            </nav>
            <main class="app">
                <Routes fallback=|| view! { <p class="not-found">"Nothing here. Try the chat."</p> }>
                    <Route path=path!("/") view=HomePage />
                    <Route path=path!("/chat") view=ChatPage />
                </Routes>
            </main>
        </Router>
    }
}

//! Chat Page

use std::rc::Rc;

use leptos::prelude::*;

use chat_core::{chart::ChartClient, ConversationManager};

use crate::api::{ChatApi, MarketApi};
use crate::components::{ChartHandle, MessageBubble, SuggestionChips};
use crate::storage::LocalStorageStore;

const CLEAR_PROMPT: &str = "Are you sure you want to clear all chat history?";

#[component]
pub fn ChatPage() -> impl IntoView {
    let manager = ConversationManager::with_defaults(Rc::new(ChatApi::new()), Rc::new(LocalStorageStore));
    manager.initialize();

    // Mirror the manager's watch channel into a signal
    let state = RwSignal::new(manager.snapshot());
    let mut updates = manager.subscribe();
    leptos::task::spawn_local(async move {
        while updates.changed().await.is_ok() {
            let next = updates.borrow_and_update().clone();
            state.set(next);
        }
    });

    let manager = StoredValue::new_local(Rc::new(manager));
    let chart: ChartHandle = StoredValue::new_local(Rc::new(MarketApi::new()) as Rc<dyn ChartClient>);
    let (input, set_input) = signal(String::new());

    let send = move |text: String| {
        if text.trim().is_empty() || state.with(|s| s.pending) {
            return;
        }
        set_input.set(String::new());
        leptos::task::spawn_local(async move {
            let manager = manager.get_value();
            let outcome = manager.submit_user_message(&text).await;
            tracing::debug!(?outcome, "Message submitted");
        });
    };

    let clear = move |_| {
        let confirmed = window().confirm_with_message(CLEAR_PROMPT).unwrap_or(false);
        if confirmed {
            manager.with_value(|m| m.clear());
        }
    };

    let pending = move || state.with(|s| s.pending);
    let fresh = move || state.with(|s| s.transcript.len() <= 1);

    view! {
        <div class="chat">
            <header class="chat-header">
                <h2>"Crypto Assistant"</h2>
                {move || {
                    state
                        .with(|s| s.current_asset)
                        .map(|asset| view! { <span class="badge">{asset.display_name()}</span> })
                }}
                <button class="btn clear" on:click=clear>"Clear History"</button>
            </header>

            <main class="chat-main">
                <div class="messages">
                    <For
                        each=move || {
                            state.with(|s| s.transcript.turns().iter().cloned().enumerate().collect::<Vec<_>>())
                        }
                        key=|(i, turn)| (*i, turn.created_at)
                        children=move |(_, turn)| view! { <MessageBubble turn=turn chart=chart /> }
                    />
                    <Show when=pending>
                        <div class="message loading">"Thinking..."</div>
                    </Show>
                </div>

                <Show when=fresh>
                    <SuggestionChips on_pick=Callback::new(send) />
                </Show>

                <div class="input-area">
                    <textarea
                        placeholder="Ask about Bitcoin, Ethereum, or any crypto..."
                        prop:value=move || input.get()
                        on:input=move |ev| set_input.set(event_target_value(&ev))
                        on:keydown=move |ev| {
                            if ev.key() == "Enter" && !ev.shift_key() {
                                ev.prevent_default();
                                send(input.get());
                            }
                        }
                    />
                    <button on:click=move |_| send(input.get()) disabled=pending>
                        {move || if pending() { "..." } else { "Send" }}
                    </button>
                </div>
            </main>
        </div>
    }
}

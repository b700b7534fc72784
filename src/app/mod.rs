use crate::pages::{
    CoachPage, CyclePage, LoginPage, RecipesPage, RegistrationPage, RootAuthed, RootPage,
    SettingsPage, WorkoutsPage,
};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("login") view=LoginPage />
                <Route path=path!("signup") view=RegistrationPage />
                <Route path=path!("workouts") view=move || view! {
                    <RootAuthed>
                        <WorkoutsPage />
                    </RootAuthed>
                } />
                <Route path=path!("recipes") view=move || view! {
                    <RootAuthed>
                        <RecipesPage />
                    </RootAuthed>
                } />
                <Route path=path!("cycle") view=move || view! {
                    <RootAuthed>
                        <CyclePage />
                    </RootAuthed>
                } />
                <Route path=path!("coach") view=move || view! {
                    <RootAuthed>
                        <CoachPage />
                    </RootAuthed>
                } />
                <Route path=path!("settings") view=move || view! {
                    <RootAuthed>
                        <SettingsPage />
                    </RootAuthed>
                } />
                <Route path=path!("") view=RootPage />
            </Routes>
        </Router>
    }
}

use crate::api::{ApiErrorKind, RECIPES_PATH, WORKOUTS_PATH};
use crate::components::hooks::use_random_id;
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardTitle, Input, Label, Spinner, Textarea,
};
use crate::cycle::{compute_phase, upsert_entry, DayLog, PeriodMarker, Phase};
use crate::dom::{escape_html, item_element, render_list, ElementContainer};
use crate::models::{ChatMessage, ChatRole, Workout};
use crate::state::AppContext;
use crate::storage::{
    load_recent_workouts, remove_from_storage, save_chat_history, save_cycle_config,
    save_cycle_log, save_user_to_storage, write_recent_workout, CHAT_HISTORY_KEY,
};
use crate::util::{
    format_ymd, month_grid, month_label, next_month, prev_month, today_local,
};
use chrono::{Datelike, NaiveDate};
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_location;
use std::collections::BTreeSet;
use wasm_bindgen::JsCast;

const SYMPTOM_CHOICES: [&str; 6] = ["cramps", "headache", "bloating", "fatigue", "acne", "backache"];
const MOOD_CHOICES: [&str; 5] = ["great", "good", "okay", "low", "irritable"];

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();
        let mut api_client = app_state.0.api_client.get_untracked();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.sign_in(&email_val, &password_val).await {
                Ok(response) => {
                    let profile = response.profile();
                    api_client.set_token(response.id_token);
                    api_client.save_to_storage();
                    save_user_to_storage(&profile);
                    app_state.0.api_client.set(api_client);
                    app_state.0.current_user.set(Some(profile));
                    let _ = window().location().set_href("/");
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-md flex-col justify-center px-4 py-12">
                <div class="mb-6">
                    <a href="/" class="text-sm font-medium text-foreground">"Verve"</a>
                    <div class="text-xs text-muted-foreground">"Move well, eat well, feel well."</div>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-xl">"Sign in"</CardTitle>
                        <CardDescription>
                            "Welcome back. Use your Verve account to continue."
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-4" on:submit=on_submit>
                            <div class="flex flex-col gap-2">
                                <Label html_for="email">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    bind_value=email
                                    required=true
                                />
                            </div>

                            <div class="flex flex-col gap-2">
                                <Label html_for="password">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                    required=true
                                />
                            </div>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                {move || {
                                    error.get().map(|e| view! {
                                        <Alert class="border-destructive/30">
                                            <AlertDescription class="text-destructive">{e}</AlertDescription>
                                        </Alert>
                                    })
                                }}
                            </Show>

                            <Button class="w-full" attr:disabled=move || loading.get()>
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Signing in..." } else { "Sign in" }}
                                </span>
                            </Button>
                        </form>
                    </CardContent>
                </Card>

                <div class="mt-4 text-xs text-muted-foreground">
                    "No account? "
                    <a class="text-primary underline underline-offset-4" href="/signup">"Create one"</a>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn RegistrationPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let confirm_password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);
    let success: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();
        let confirm_password_val = confirm_password.get();
        let api_client = app_state.0.api_client.get_untracked();

        if password_val != confirm_password_val {
            error.set(Some("Passwords do not match".to_string()));
            return;
        }

        if password_val.len() < 6 {
            error.set(Some("Password must be at least 6 characters".to_string()));
            return;
        }

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.sign_up(&email_val, &password_val).await {
                Ok(_response) => {
                    // The provider returns a session token on signup; we keep
                    // UX simple and ask the user to sign in.
                    success.set(true);
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-md flex-col justify-center px-4 py-12">
                <div class="mb-6">
                    <a href="/" class="text-sm font-medium text-foreground">"Verve"</a>
                    <div class="text-xs text-muted-foreground">"Create your account."</div>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-xl">"Create account"</CardTitle>
                        <CardDescription>
                            "Your data stays on this device; the account only signs your sessions."
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <Show
                            when=move || !success.get()
                            fallback=move || view! {
                                <Alert>
                                    <AlertDescription>
                                        "Account created. You can now "
                                        <a class="text-primary underline underline-offset-4" href="/login">"sign in"</a>
                                        "."
                                    </AlertDescription>
                                </Alert>
                            }
                        >
                            <form class="flex flex-col gap-4" on:submit=on_submit>
                                <div class="flex flex-col gap-2">
                                    <Label html_for="email">"Email"</Label>
                                    <Input
                                        id="email"
                                        r#type="email"
                                        placeholder="you@example.com"
                                        bind_value=email
                                        required=true
                                    />
                                </div>

                                <div class="flex flex-col gap-2">
                                    <Label html_for="password">"Password"</Label>
                                    <Input
                                        id="password"
                                        r#type="password"
                                        placeholder="••••••••"
                                        bind_value=password
                                        required=true
                                    />
                                </div>

                                <div class="flex flex-col gap-2">
                                    <Label html_for="confirm_password">"Confirm password"</Label>
                                    <Input
                                        id="confirm_password"
                                        r#type="password"
                                        placeholder="••••••••"
                                        bind_value=confirm_password
                                        required=true
                                    />
                                </div>

                                <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                    {move || {
                                        error.get().map(|e| view! {
                                            <Alert class="border-destructive/30">
                                                <AlertDescription class="text-destructive">{e}</AlertDescription>
                                            </Alert>
                                        })
                                    }}
                                </Show>

                                <Button class="w-full" attr:disabled=move || loading.get()>
                                    <span class="inline-flex items-center gap-2">
                                        <Show when=move || loading.get() fallback=|| ().into_view()>
                                            <Spinner />
                                        </Show>
                                        {move || if loading.get() { "Creating..." } else { "Create account" }}
                                    </span>
                                </Button>
                            </form>
                        </Show>
                    </CardContent>
                </Card>

                <div class="mt-4 text-xs text-muted-foreground">
                    "Already have an account? "
                    <a class="text-primary underline underline-offset-4" href="/login">"Sign in"</a>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn AppLayout(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let capabilities = app_state.0.capabilities;

    let location = use_location();
    let pathname = move || location.pathname.get();

    let on_logout = move |_| {
        let mut api_client = app_state.0.api_client.get_untracked();
        api_client.logout();
        app_state.0.api_client.set(api_client);
        app_state.0.current_user.set(None);
        let _ = window().location().set_href("/login");
    };

    let nav_items = [
        ("/", "Today"),
        ("/workouts", "Workouts"),
        ("/recipes", "Recipes"),
        ("/cycle", "Cycle"),
        ("/coach", "Coach"),
        ("/settings", "Settings"),
    ];

    let children = StoredValue::new(children);

    view! {
        <div class="min-h-screen bg-background">
            <header class="sticky top-0 z-10 border-b bg-background/95 backdrop-blur">
                <div class="mx-auto flex w-full max-w-[1080px] items-center justify-between px-4 py-3">
                    <a href="/" class="text-sm font-semibold text-foreground">"Verve"</a>

                    <nav class="flex items-center gap-1">
                        {nav_items
                            .into_iter()
                            .map(|(path, label)| {
                                let active = move || {
                                    let p = pathname();
                                    if path == "/" { p == "/" } else { p.starts_with(path) }
                                };
                                view! {
                                    <a
                                        href=path
                                        class=move || {
                                            if active() {
                                                "rounded-md bg-accent px-3 py-1.5 text-xs font-medium text-accent-foreground"
                                            } else {
                                                "rounded-md px-3 py-1.5 text-xs text-muted-foreground hover:bg-accent/50 hover:text-foreground"
                                            }
                                        }
                                    >
                                        {label}
                                    </a>
                                }
                            })
                            .collect_view()}
                    </nav>

                    <Button size=ButtonSize::Sm variant=ButtonVariant::Ghost on:click=on_logout>
                        "Sign out"
                    </Button>
                </div>
            </header>

            <Show when=move || !capabilities.storage fallback=|| ().into_view()>
                <div class="mx-auto w-full max-w-[1080px] px-4 pt-4">
                    <Alert class="border-destructive/30">
                        <AlertDescription class="text-destructive">
                            "Local storage is unavailable in this browser session; logs and settings will not persist."
                        </AlertDescription>
                    </Alert>
                </div>
            </Show>

            <main class="mx-auto w-full max-w-[1080px] px-4 py-8">
                {move || children.with_value(|c| c())}
            </main>
        </div>
    }
}

#[component]
pub fn RootAuthed(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let is_authenticated = move || app_state.0.api_client.get().is_authenticated();

    // Store children so the view macro sees an `Fn` (not an `FnOnce`).
    let children = StoredValue::new(children);

    view! {
        <Show when=is_authenticated fallback=move || view! { <LoginPage /> }>
            <AppLayout>
                {move || children.with_value(|c| c())}
            </AppLayout>
        </Show>
    }
}

#[component]
pub fn RootPage() -> impl IntoView {
    view! {
        <RootAuthed>
            <DashboardPage />
        </RootAuthed>
    }
}

fn phase_badge_class(phase: Phase) -> &'static str {
    match phase {
        Phase::Menstruation => "bg-rose-100 text-rose-700",
        Phase::Follicular => "bg-emerald-100 text-emerald-700",
        Phase::Ovulation => "bg-amber-100 text-amber-700",
        Phase::Luteal => "bg-indigo-100 text-indigo-700",
        Phase::Unknown => "bg-muted text-muted-foreground",
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let greeting = move || {
        match app_state.0.current_user.get() {
            Some(user) => match user.display_name {
                Some(name) => format!("Hello, {name}"),
                None => format!("Hello, {}", user.email),
            },
            None => "Hello".to_string(),
        }
    };

    let today_info = move || {
        let config = app_state.0.cycle_config.get();
        let log = app_state.0.cycle_log.get();
        compute_phase(today_local(), &config, &log)
    };

    let recents = load_recent_workouts();
    let has_recents = !recents.is_empty();

    view! {
        <div class="flex flex-col gap-6">
            <div class="space-y-1">
                <h1 class="text-xl font-semibold">{greeting}</h1>
                <p class="text-xs text-muted-foreground">
                    {format!("Today is {}", format_ymd(today_local()))}
                </p>
            </div>

            <div class="grid gap-4 sm:grid-cols-2">
                <Card>
                    <CardHeader>
                        <CardTitle>"Cycle today"</CardTitle>
                        <CardDescription>"Estimate from your logged history."</CardDescription>
                    </CardHeader>
                    <CardContent>
                        {move || {
                            let info = today_info();
                            view! {
                                <div class="flex items-center gap-3">
                                    <span class=format!(
                                        "rounded-full px-3 py-1 text-xs font-medium {}",
                                        phase_badge_class(info.phase),
                                    )>
                                        {info.phase.label()}
                                    </span>
                                    {match info.day_of_cycle {
                                        Some(day) => view! {
                                            <span class="text-xs text-muted-foreground">
                                                {format!("Day {day}")}
                                            </span>
                                        }.into_any(),
                                        None => view! {
                                            <span class="text-xs text-muted-foreground">
                                                "Log a period start to get estimates."
                                            </span>
                                        }.into_any(),
                                    }}
                                </div>
                            }
                        }}
                        <div class="mt-4">
                            <a class="text-xs text-primary underline underline-offset-4" href="/cycle">
                                "Open calendar"
                            </a>
                        </div>
                    </CardContent>
                </Card>

                <Card>
                    <CardHeader>
                        <CardTitle>"Pick up where you left off"</CardTitle>
                        <CardDescription>"Recently opened workouts."</CardDescription>
                    </CardHeader>
                    <CardContent>
                        <Show
                            when=move || has_recents
                            fallback=|| view! {
                                <div class="text-xs text-muted-foreground">
                                    "Nothing yet. "
                                    <a class="text-primary underline underline-offset-4" href="/workouts">
                                        "Browse workouts"
                                    </a>
                                </div>
                            }
                        >
                            <ul class="flex flex-col gap-2">
                                {recents
                                    .iter()
                                    .map(|w| view! {
                                        <li class="text-sm">
                                            <a class="hover:underline" href="/workouts">{w.title.clone()}</a>
                                        </li>
                                    })
                                    .collect_view()}
                            </ul>
                        </Show>
                    </CardContent>
                </Card>
            </div>

            <Card>
                <CardHeader>
                    <CardTitle>"Ask the coach"</CardTitle>
                    <CardDescription>
                        "Training, recovery, nutrition. Short practical answers."
                    </CardDescription>
                </CardHeader>
                <CardContent>
                    <a class="text-xs text-primary underline underline-offset-4" href="/coach">
                        "Start a conversation"
                    </a>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
pub fn WorkoutsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let workouts = app_state.0.workouts;
    let loading = app_state.0.workouts_loading;
    let error = app_state.0.workouts_error;
    let filter = app_state.0.workout_filter;

    let list_ref: NodeRef<html::Div> = NodeRef::new();

    let load_workouts = StoredValue::new(move |force: bool| {
        if !force {
            let loaded = app_state.0.workouts_loaded_once.get_untracked();
            let is_loading = loading.get_untracked();
            let has_error = error.get_untracked().is_some();
            if (loaded && !has_error) || is_loading {
                return;
            }
        }

        loading.set(true);
        error.set(None);

        let mut content = app_state.0.content.get_untracked();
        spawn_local(async move {
            if force {
                content.invalidate(WORKOUTS_PATH);
            }

            match content.get_workouts().await {
                Ok(list) => {
                    workouts.set(list);
                    app_state.0.workouts_loaded_once.set(true);
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            // Write the client back so the memoized document survives.
            app_state.0.content.set(content);
            loading.set(false);
        });
    });

    Effect::new(move |_| {
        load_workouts.with_value(|load| load(false));
    });

    let categories = move || {
        workouts
            .get()
            .iter()
            .map(|w| w.category.clone())
            .filter(|c| !c.trim().is_empty())
            .collect::<BTreeSet<_>>()
    };

    let filtered = move || {
        let selected = filter.get();
        workouts
            .get()
            .into_iter()
            .filter(|w| match &selected {
                Some(category) => &w.category == category,
                None => true,
            })
            .collect::<Vec<_>>()
    };

    // Paint the list through the keyed renderer: refreshes keep unchanged
    // item nodes alive (hover states, media) instead of rebuilding them.
    Effect::new(move |_| {
        let items = filtered();
        let Some(el) = list_ref.get() else {
            return;
        };

        let mut container = ElementContainer::new(web_sys::Element::from(el));
        render_list(
            &mut container,
            &items,
            |w| w.id.clone(),
            workout_item_node,
            || {
                item_element(
                    "div",
                    "px-1 py-6 text-xs text-muted-foreground",
                    "No workouts match this filter.",
                )
            },
        );
    });

    // Item markup is static per node; clicks are delegated to the container.
    let on_list_click = move |ev: web_sys::MouseEvent| {
        let Some(target) = ev.target() else {
            return;
        };
        let Some(el) = target.dyn_ref::<web_sys::Element>().cloned() else {
            return;
        };
        let Ok(Some(item)) = el.closest("[data-key]") else {
            return;
        };
        let Some(key) = item.get_attribute("data-key") else {
            return;
        };

        if let Some(w) = workouts.get_untracked().iter().find(|w| w.id == key) {
            write_recent_workout(&w.id, &w.title);
        }
    };

    view! {
        <div class="flex flex-col gap-4">
            <div class="flex items-center justify-between">
                <div class="space-y-1">
                    <h1 class="text-xl font-semibold">"Workouts"</h1>
                    <p class="text-xs text-muted-foreground">
                        {move || format!("{} total", workouts.get().len())}
                    </p>
                </div>

                <Button
                    attr:disabled=move || loading.get()
                    on:click=move |_| load_workouts.with_value(|load| load(true))
                >
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || loading.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || if loading.get() { "Refreshing" } else { "Refresh" }}
                    </span>
                </Button>
            </div>

            <div class="flex flex-wrap items-center gap-2">
                {move || {
                    let selected = filter.get();
                    let mut chips = vec![(None::<String>, "All".to_string())];
                    chips.extend(categories().into_iter().map(|c| (Some(c.clone()), c)));

                    chips
                        .into_iter()
                        .map(|(value, label)| {
                            let variant = if selected == value {
                                ButtonVariant::Default
                            } else {
                                ButtonVariant::Outline
                            };
                            let on_pick = {
                                let value = value.clone();
                                move |_| filter.set(value.clone())
                            };
                            view! {
                                <Button size=ButtonSize::Chip variant=variant on:click=on_pick>
                                    {label}
                                </Button>
                            }
                        })
                        .collect_view()
                }}
            </div>

            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                {move || {
                    error.get().map(|e| view! {
                        <Alert class="border-destructive/30">
                            <AlertDescription class="text-destructive">{e}</AlertDescription>
                        </Alert>
                    })
                }}
            </Show>

            <Show when=move || loading.get() && workouts.get().is_empty() fallback=|| ().into_view()>
                <div class="text-xs text-muted-foreground">"Loading workouts..."</div>
            </Show>

            <div
                class="flex flex-col gap-3"
                role="list"
                node_ref=list_ref
                on:click=on_list_click
            ></div>
        </div>
    }
}

fn workout_item_node(w: &Workout) -> web_sys::Element {
    let meta = format!(
        "{} · {} min · {}",
        escape_html(&w.category),
        w.minutes,
        escape_html(&w.level),
    );

    let watch = match &w.video_url {
        Some(url) => format!(
            r#"<a class="text-xs text-primary underline underline-offset-4" href="{}" target="_blank" rel="noopener">Watch</a>"#,
            escape_html(url),
        ),
        None => String::new(),
    };

    let html = format!(
        r#"<div class="flex flex-col gap-1"><div class="text-sm font-medium">{}</div><div class="text-xs text-muted-foreground">{meta}</div><div class="text-xs text-muted-foreground">{}</div></div><div>{watch}</div>"#,
        escape_html(&w.title),
        escape_html(&w.description),
    );

    item_element(
        "div",
        "flex items-start justify-between gap-4 rounded-md border px-4 py-3",
        &html,
    )
}

#[component]
pub fn RecipesPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let recipes = app_state.0.recipes;
    let loading = app_state.0.recipes_loading;
    let error = app_state.0.recipes_error;
    let can_share = app_state.0.capabilities.share;

    let load_recipes = StoredValue::new(move |force: bool| {
        if !force {
            let loaded = app_state.0.recipes_loaded_once.get_untracked();
            let is_loading = loading.get_untracked();
            let has_error = error.get_untracked().is_some();
            if (loaded && !has_error) || is_loading {
                return;
            }
        }

        loading.set(true);
        error.set(None);

        let mut content = app_state.0.content.get_untracked();
        spawn_local(async move {
            if force {
                content.invalidate(RECIPES_PATH);
            }

            match content.get_recipes().await {
                Ok(list) => {
                    recipes.set(list);
                    app_state.0.recipes_loaded_once.set(true);
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            app_state.0.content.set(content);
            loading.set(false);
        });
    });

    Effect::new(move |_| {
        load_recipes.with_value(|load| load(false));
    });

    let share_recipe = move |title: String| {
        let Some(window) = web_sys::window() else {
            return;
        };
        let navigator = window.navigator();

        let data = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&data, &"title".into(), &"Verve recipe".into());
        let _ = js_sys::Reflect::set(&data, &"text".into(), &title.into());

        // navigator.share is behind the startup capability probe; the
        // returned promise is fire-and-forget.
        if let Ok(share) = js_sys::Reflect::get(navigator.as_ref(), &"share".into()) {
            if let Some(f) = share.dyn_ref::<js_sys::Function>() {
                let _ = f.call1(navigator.as_ref(), &data);
            }
        }
    };

    view! {
        <div class="flex flex-col gap-4">
            <div class="flex items-center justify-between">
                <div class="space-y-1">
                    <h1 class="text-xl font-semibold">"Recipes"</h1>
                    <p class="text-xs text-muted-foreground">
                        {move || format!("{} total", recipes.get().len())}
                    </p>
                </div>

                <Button
                    attr:disabled=move || loading.get()
                    on:click=move |_| load_recipes.with_value(|load| load(true))
                >
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || loading.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || if loading.get() { "Refreshing" } else { "Refresh" }}
                    </span>
                </Button>
            </div>

            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                {move || {
                    error.get().map(|e| view! {
                        <Alert class="border-destructive/30">
                            <AlertDescription class="text-destructive">{e}</AlertDescription>
                        </Alert>
                    })
                }}
            </Show>

            <Show
                when=move || !recipes.get().is_empty()
                fallback=move || view! {
                    <div class="text-xs text-muted-foreground">
                        {move || if loading.get() { "Loading recipes..." } else { "No recipes yet." }}
                    </div>
                }
            >
                <div class="grid gap-4 sm:grid-cols-2">
                    {move || {
                        recipes
                            .get()
                            .into_iter()
                            .map(|recipe| {
                                // StoredValue keeps the share handler Copy.
                                let title_sv = StoredValue::new(recipe.title.clone());
                                let description = recipe.description.clone();
                                let tags = recipe.tags.join(" · ");
                                let ingredient_count = recipe.ingredients.len();
                                let meta = if tags.is_empty() {
                                    format!("{} min", recipe.minutes)
                                } else {
                                    format!("{} min · {tags}", recipe.minutes)
                                };

                                view! {
                                    <Card>
                                        <CardHeader>
                                            <CardTitle class="text-base">{recipe.title.clone()}</CardTitle>
                                            <CardDescription>{meta}</CardDescription>
                                        </CardHeader>
                                        <CardContent class="flex flex-col gap-2">
                                            <p class="text-sm text-muted-foreground">{description}</p>
                                            <Show when=move || (ingredient_count > 0) fallback=|| ().into_view()>
                                                <p class="text-xs text-muted-foreground">
                                                    {format!("{ingredient_count} ingredients")}
                                                </p>
                                            </Show>
                                            {can_share.then(|| view! {
                                                <Button
                                                    size=ButtonSize::Sm
                                                    variant=ButtonVariant::Ghost
                                                    on:click=move |_| share_recipe(title_sv.get_value())
                                                >
                                                    "Share"
                                                </Button>
                                            })}
                                        </CardContent>
                                    </Card>
                                }
                            })
                            .collect_view()
                    }}
                </div>
            </Show>
        </div>
    }
}

fn phase_cell_class(phase: Phase) -> &'static str {
    match phase {
        Phase::Menstruation => "bg-rose-100",
        Phase::Follicular => "bg-emerald-50",
        Phase::Ovulation => "bg-amber-100",
        Phase::Luteal => "bg-indigo-50",
        Phase::Unknown => "",
    }
}

#[component]
pub fn CyclePage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let cycle_log = app_state.0.cycle_log;
    let cycle_config = app_state.0.cycle_config;

    let today = today_local();
    let view_year: RwSignal<i32> = RwSignal::new(today.year());
    let view_month: RwSignal<u32> = RwSignal::new(today.month());
    let selected: RwSignal<Option<NaiveDate>> = RwSignal::new(Some(today));

    // Day editor state, populated from the log whenever selection changes.
    let period_choice: RwSignal<Option<PeriodMarker>> = RwSignal::new(None);
    let symptoms: RwSignal<Vec<String>> = RwSignal::new(vec![]);
    let mood: RwSignal<Option<String>> = RwSignal::new(None);
    let notes: RwSignal<String> = RwSignal::new(String::new());

    Effect::new(move |_| {
        let entry = selected
            .get()
            .and_then(|date| cycle_log.get_untracked().get(&date).cloned())
            .unwrap_or_default();

        period_choice.set(entry.period);
        symptoms.set(entry.symptoms);
        mood.set(entry.mood);
        notes.set(entry.notes.unwrap_or_default());
    });

    let on_prev_month = move |_| {
        let (y, m) = prev_month(view_year.get_untracked(), view_month.get_untracked());
        view_year.set(y);
        view_month.set(m);
    };
    let on_next_month = move |_| {
        let (y, m) = next_month(view_year.get_untracked(), view_month.get_untracked());
        view_year.set(y);
        view_month.set(m);
    };

    let on_save = move |_| {
        let Some(date) = selected.get_untracked() else {
            return;
        };

        let entry = DayLog {
            period: period_choice.get_untracked(),
            symptoms: symptoms.get_untracked(),
            mood: mood.get_untracked(),
            notes: {
                let text = notes.get_untracked();
                if text.trim().is_empty() { None } else { Some(text) }
            },
        };

        // An all-empty submission deletes the day instead of storing a blank.
        let mut log = cycle_log.get_untracked();
        upsert_entry(&mut log, date, entry);
        save_cycle_log(&log);
        cycle_log.set(log);
    };

    let on_clear_day = move |_| {
        let Some(date) = selected.get_untracked() else {
            return;
        };

        let mut log = cycle_log.get_untracked();
        upsert_entry(&mut log, date, DayLog::default());
        save_cycle_log(&log);
        cycle_log.set(log);

        period_choice.set(None);
        symptoms.set(vec![]);
        mood.set(None);
        notes.set(String::new());
    };

    let toggle_symptom = move |name: &str| {
        let name = name.to_string();
        symptoms.update(|list| {
            if let Some(at) = list.iter().position(|s| s == &name) {
                list.remove(at);
            } else {
                list.push(name);
            }
        });
    };

    let selected_info = move || {
        selected.get().map(|date| {
            let config = cycle_config.get();
            let log = cycle_log.get();
            (date, compute_phase(date, &config, &log))
        })
    };

    view! {
        <div class="flex flex-col gap-4">
            <div class="space-y-1">
                <h1 class="text-xl font-semibold">"Cycle"</h1>
                <p class="text-xs text-muted-foreground">
                    "Tap a day to log it. Estimates recompute from your history."
                </p>
            </div>

            <div class="grid gap-4 lg:grid-cols-[2fr_1fr]">
                <Card>
                    <CardHeader class="w-full">
                        <div class="flex w-full items-center justify-between">
                            <Button size=ButtonSize::Sm variant=ButtonVariant::Ghost on:click=on_prev_month>
                                "<"
                            </Button>
                            <CardTitle class="text-base">
                                {move || month_label(view_year.get(), view_month.get())}
                            </CardTitle>
                            <Button size=ButtonSize::Sm variant=ButtonVariant::Ghost on:click=on_next_month>
                                ">"
                            </Button>
                        </div>
                    </CardHeader>

                    <CardContent>
                        <div class="grid grid-cols-7 gap-1 text-center text-[10px] text-muted-foreground">
                            {["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
                                .into_iter()
                                .map(|d| view! { <div class="py-1">{d}</div> })
                                .collect_view()}
                        </div>

                        <div class="grid grid-cols-7 gap-1">
                            {move || {
                                let config = cycle_config.get();
                                let log = cycle_log.get();
                                let today = today_local();

                                month_grid(view_year.get(), view_month.get())
                                    .into_iter()
                                    .map(|cell| match cell {
                                        None => view! { <div class="aspect-square"></div> }.into_any(),
                                        Some(date) => {
                                            let info = compute_phase(date, &config, &log);
                                            let has_entry = log.contains_key(&date);
                                            let is_selected = move || selected.get() == Some(date);
                                            let is_today = date == today;

                                            let base_class = phase_cell_class(info.phase);
                                            let cell_class = move || {
                                                format!(
                                                    "aspect-square rounded-md border text-xs flex flex-col items-center justify-center gap-0.5 hover:border-primary/60 cursor-pointer {} {} {}",
                                                    base_class,
                                                    if is_selected() { "ring-2 ring-primary" } else { "" },
                                                    if is_today { "border-primary" } else { "border-transparent" },
                                                )
                                            };

                                            view! {
                                                <button class=cell_class on:click=move |_| selected.set(Some(date))>
                                                    <span>{date.day()}</span>
                                                    <Show when=move || has_entry fallback=|| ().into_view()>
                                                        <span class="size-1 rounded-full bg-foreground/60"></span>
                                                    </Show>
                                                </button>
                                            }
                                            .into_any()
                                        }
                                    })
                                    .collect_view()
                            }}
                        </div>

                        <div class="mt-4 flex flex-wrap gap-3 text-[10px] text-muted-foreground">
                            {[
                                (Phase::Menstruation, "Menstruation"),
                                (Phase::Follicular, "Follicular"),
                                (Phase::Ovulation, "Ovulation"),
                                (Phase::Luteal, "Luteal"),
                            ]
                                .into_iter()
                                .map(|(phase, label)| view! {
                                    <span class="inline-flex items-center gap-1">
                                        <span class=format!("size-2 rounded-sm {}", phase_cell_class(phase))></span>
                                        {label}
                                    </span>
                                })
                                .collect_view()}
                        </div>
                    </CardContent>
                </Card>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-base">
                            {move || match selected_info() {
                                Some((date, _)) => format_ymd(date),
                                None => "Pick a day".to_string(),
                            }}
                        </CardTitle>
                        <CardDescription>
                            {move || match selected_info() {
                                Some((_, info)) => match info.day_of_cycle {
                                    Some(day) => format!("{} · day {day}", info.phase.label()),
                                    None => info.phase.label().to_string(),
                                },
                                None => String::new(),
                            }}
                        </CardDescription>
                    </CardHeader>

                    <CardContent class="flex flex-col gap-4">
                        <div class="flex flex-col gap-2">
                            <Label>"Period"</Label>
                            <div class="flex flex-wrap gap-2">
                                {move || {
                                    let current = period_choice.get();
                                    [
                                        (None, "None"),
                                        (Some(PeriodMarker::Start), "Start"),
                                        (Some(PeriodMarker::Flow), "Flow"),
                                        (Some(PeriodMarker::End), "End"),
                                    ]
                                        .into_iter()
                                        .map(|(value, label)| {
                                            let variant = if current == value {
                                                ButtonVariant::Default
                                            } else {
                                                ButtonVariant::Outline
                                            };
                                            view! {
                                                <Button
                                                    size=ButtonSize::Chip
                                                    variant=variant
                                                    on:click=move |_| period_choice.set(value)
                                                >
                                                    {label}
                                                </Button>
                                            }
                                        })
                                        .collect_view()
                                }}
                            </div>
                        </div>

                        <div class="flex flex-col gap-2">
                            <Label>"Symptoms"</Label>
                            <div class="flex flex-wrap gap-2">
                                {move || {
                                    let current = symptoms.get();
                                    SYMPTOM_CHOICES
                                        .into_iter()
                                        .map(|name| {
                                            let variant = if current.iter().any(|s| s == name) {
                                                ButtonVariant::Default
                                            } else {
                                                ButtonVariant::Outline
                                            };
                                            view! {
                                                <Button
                                                    size=ButtonSize::Chip
                                                    variant=variant
                                                    on:click=move |_| toggle_symptom(name)
                                                >
                                                    {name}
                                                </Button>
                                            }
                                        })
                                        .collect_view()
                                }}
                            </div>
                        </div>

                        <div class="flex flex-col gap-2">
                            <Label>"Mood"</Label>
                            <div class="flex flex-wrap gap-2">
                                {move || {
                                    let current = mood.get();
                                    MOOD_CHOICES
                                        .into_iter()
                                        .map(|name| {
                                            let variant = if current.as_deref() == Some(name) {
                                                ButtonVariant::Default
                                            } else {
                                                ButtonVariant::Outline
                                            };
                                            view! {
                                                <Button
                                                    size=ButtonSize::Chip
                                                    variant=variant
                                                    on:click=move |_| {
                                                        // Tapping the active mood clears it.
                                                        if mood.get_untracked().as_deref() == Some(name) {
                                                            mood.set(None);
                                                        } else {
                                                            mood.set(Some(name.to_string()));
                                                        }
                                                    }
                                                >
                                                    {name}
                                                </Button>
                                            }
                                        })
                                        .collect_view()
                                }}
                            </div>
                        </div>

                        <div class="flex flex-col gap-2">
                            <Label html_for="day_notes">"Notes"</Label>
                            <Textarea id="day_notes" placeholder="Anything worth remembering?" bind_value=notes />
                        </div>

                        <div class="flex items-center gap-2">
                            <Button on:click=on_save>"Save day"</Button>
                            <Button variant=ButtonVariant::Ghost on:click=on_clear_day>"Clear day"</Button>
                        </div>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub fn CoachPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let messages = app_state.0.chat_messages;
    let pending = app_state.0.chat_pending;
    let error = app_state.0.chat_error;

    let draft: RwSignal<String> = RwSignal::new(String::new());
    let log_ref: NodeRef<html::Div> = NodeRef::new();

    // The transcript is painted through the keyed renderer: past message
    // nodes are immutable, so repaints only append (and never disturb text
    // selection in older bubbles).
    Effect::new(move |_| {
        let items = messages.get();
        let Some(el) = log_ref.get() else {
            return;
        };

        let mut container = ElementContainer::new(web_sys::Element::from(el.clone()));
        render_list(
            &mut container,
            &items,
            |m| m.id.clone(),
            chat_message_node,
            || {
                item_element(
                    "div",
                    "px-1 py-6 text-xs text-muted-foreground",
                    "Ask about training, recovery or nutrition to get started.",
                )
            },
        );

        // Keep the newest message in view.
        el.set_scroll_top(el.scroll_height());
    });

    let send = move || {
        if pending.get_untracked() {
            return;
        }

        let text = draft.get_untracked().trim().to_string();
        if text.is_empty() {
            return;
        }
        draft.set(String::new());
        error.set(None);

        let user_message = ChatMessage {
            id: use_random_id(),
            role: ChatRole::User,
            text,
            at_ms: crate::util::now_ms(),
        };

        let mut history = messages.get_untracked();
        history.push(user_message);
        save_chat_history(&history);
        messages.set(history.clone());

        let req_id = app_state.0.chat_request_id.get_untracked().saturating_add(1);
        app_state.0.chat_request_id.set(req_id);
        pending.set(true);

        let assistant = app_state.0.assistant.get_untracked();
        spawn_local(async move {
            let result = assistant.generate(&history).await;

            // Ignore responses from superseded requests (e.g. after the
            // conversation was cleared mid-flight).
            if app_state.0.chat_request_id.get_untracked() != req_id {
                return;
            }

            match result {
                Ok(reply) => {
                    let coach_message = ChatMessage {
                        id: use_random_id(),
                        role: ChatRole::Coach,
                        text: reply,
                        at_ms: crate::util::now_ms(),
                    };

                    let mut next = messages.get_untracked();
                    next.push(coach_message);
                    save_chat_history(&next);
                    messages.set(next);
                }
                Err(e) => {
                    let message = if e.kind == ApiErrorKind::Network {
                        "The coach is unreachable right now; check your connection.".to_string()
                    } else {
                        e.to_string()
                    };
                    error.set(Some(message));
                }
            }
            pending.set(false);
        });
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        send();
    };

    let on_clear = move |_| {
        // Invalidate any in-flight request before dropping the transcript.
        let req_id = app_state.0.chat_request_id.get_untracked().saturating_add(1);
        app_state.0.chat_request_id.set(req_id);

        messages.set(vec![]);
        remove_from_storage(CHAT_HISTORY_KEY);
        error.set(None);
        pending.set(false);
    };

    view! {
        <div class="flex flex-col gap-4">
            <div class="flex items-center justify-between">
                <div class="space-y-1">
                    <h1 class="text-xl font-semibold">"Coach"</h1>
                    <p class="text-xs text-muted-foreground">
                        "Practical guidance, not medical advice."
                    </p>
                </div>

                <Button variant=ButtonVariant::Ghost on:click=on_clear>
                    "Clear conversation"
                </Button>
            </div>

            <Card>
                <CardContent class="flex flex-col gap-4">
                    <div
                        class="flex max-h-[50vh] min-h-48 flex-col gap-3 overflow-y-auto pr-1"
                        role="log"
                        node_ref=log_ref
                    ></div>

                    <Show when=move || pending.get() fallback=|| ().into_view()>
                        <div class="inline-flex items-center gap-2 text-xs text-muted-foreground">
                            <Spinner />
                            "Thinking..."
                        </div>
                    </Show>

                    <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                        {move || {
                            error.get().map(|e| view! {
                                <Alert class="border-destructive/30">
                                    <AlertDescription class="text-destructive">{e}</AlertDescription>
                                </Alert>
                            })
                        }}
                    </Show>

                    <form class="flex items-center gap-2" on:submit=on_submit>
                        <Input
                            id="coach_draft"
                            placeholder="How do I ease back in after a break?"
                            bind_value=draft
                        />
                        <Button attr:disabled=move || pending.get()>"Send"</Button>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

fn chat_message_node(m: &ChatMessage) -> web_sys::Element {
    let (wrapper, bubble) = match m.role {
        ChatRole::User => ("flex justify-end", "bg-primary text-primary-foreground"),
        ChatRole::Coach => ("flex justify-start", "bg-muted text-foreground"),
    };

    let html = format!(
        r#"<div class="max-w-[80%] whitespace-pre-wrap rounded-lg px-3 py-2 text-sm {bubble}">{}</div>"#,
        escape_html(&m.text),
    );

    item_element("div", wrapper, &html)
}

#[component]
pub fn SettingsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let cycle_config = app_state.0.cycle_config;
    let config = cycle_config.get_untracked();

    let cycle_length: RwSignal<String> = RwSignal::new(config.cycle_length_days.to_string());
    let period_length: RwSignal<String> = RwSignal::new(config.period_length_days.to_string());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let saved: RwSignal<bool> = RwSignal::new(false);

    let clear_armed: RwSignal<bool> = RwSignal::new(false);

    let on_save = move |_| {
        saved.set(false);

        let cycle_days = cycle_length.get_untracked().trim().parse::<u32>().ok();
        let period_days = period_length.get_untracked().trim().parse::<u32>().ok();

        let (Some(cycle_days), Some(period_days)) = (cycle_days, period_days) else {
            error.set(Some("Lengths must be whole numbers of days".to_string()));
            return;
        };
        if cycle_days == 0 || period_days == 0 {
            error.set(Some("Lengths must be at least one day".to_string()));
            return;
        }

        let next = crate::cycle::CycleConfig {
            cycle_length_days: cycle_days,
            period_length_days: period_days,
        };
        save_cycle_config(&next);
        cycle_config.set(next);
        error.set(None);
        saved.set(true);
    };

    let on_clear_cycle_data = move |_| {
        if !clear_armed.get_untracked() {
            clear_armed.set(true);
            return;
        }

        let empty = crate::cycle::CycleLog::new();
        save_cycle_log(&empty);
        app_state.0.cycle_log.set(empty);
        clear_armed.set(false);
    };

    let on_logout = move |_| {
        let mut api_client = app_state.0.api_client.get_untracked();
        api_client.logout();
        app_state.0.api_client.set(api_client);
        app_state.0.current_user.set(None);
        let _ = window().location().set_href("/login");
    };

    view! {
        <div class="flex max-w-lg flex-col gap-4">
            <div class="space-y-1">
                <h1 class="text-xl font-semibold">"Settings"</h1>
                <p class="text-xs text-muted-foreground">
                    {move || match app_state.0.current_user.get() {
                        Some(user) => format!("Signed in as {}", user.email),
                        None => "Not signed in".to_string(),
                    }}
                </p>
            </div>

            <Card>
                <CardHeader>
                    <CardTitle class="text-base">"Cycle settings"</CardTitle>
                    <CardDescription>
                        "Used for phase estimates. Your own logs always take precedence."
                    </CardDescription>
                </CardHeader>

                <CardContent class="flex flex-col gap-4">
                    <div class="flex flex-col gap-2">
                        <Label html_for="cycle_length">"Average cycle length (days)"</Label>
                        <Input id="cycle_length" r#type="number" bind_value=cycle_length />
                    </div>

                    <div class="flex flex-col gap-2">
                        <Label html_for="period_length">"Average period length (days)"</Label>
                        <Input id="period_length" r#type="number" bind_value=period_length />
                    </div>

                    <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                        {move || {
                            error.get().map(|e| view! {
                                <Alert class="border-destructive/30">
                                    <AlertDescription class="text-destructive">{e}</AlertDescription>
                                </Alert>
                            })
                        }}
                    </Show>

                    <Show when=move || saved.get() fallback=|| ().into_view()>
                        <Alert>
                            <AlertDescription>"Saved."</AlertDescription>
                        </Alert>
                    </Show>

                    <div>
                        <Button on:click=on_save>"Save"</Button>
                    </div>
                </CardContent>
            </Card>

            <Card>
                <CardHeader>
                    <CardTitle class="text-base">"Data"</CardTitle>
                    <CardDescription>"Cycle logs live only in this browser."</CardDescription>
                </CardHeader>
                <CardContent class="flex items-center gap-2">
                    <Button variant=ButtonVariant::Destructive on:click=on_clear_cycle_data>
                        {move || if clear_armed.get() { "Click again to confirm" } else { "Delete cycle logs" }}
                    </Button>
                    <Show when=move || clear_armed.get() fallback=|| ().into_view()>
                        <Button variant=ButtonVariant::Ghost on:click=move |_| clear_armed.set(false)>
                            "Cancel"
                        </Button>
                    </Show>
                </CardContent>
            </Card>

            <Card>
                <CardHeader>
                    <CardTitle class="text-base">"Session"</CardTitle>
                </CardHeader>
                <CardContent>
                    <Button variant=ButtonVariant::Outline on:click=on_logout>"Sign out"</Button>
                </CardContent>
            </Card>
        </div>
    }
}

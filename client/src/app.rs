use gloo_timers::callback::Timeout;
use leptos::prelude::*;

use uhi_shared::{Basemap, ControlCommand, LayerChoice};

use crate::onboarding;
use crate::session::{self, ActiveLegend, MAP_CONTAINER_ID, Session, SessionStore};

#[derive(Clone, Copy)]
pub(crate) struct ControlsVisible(pub RwSignal<bool>);

/// Root component: map container plus the floating controls panel.
#[component]
pub fn App() -> impl IntoView {
    let store = SessionStore(StoredValue::new_local(Session::new(session::initial_view())));
    let legend = ActiveLegend(RwSignal::new(None));
    let controls_visible = RwSignal::new(true);

    provide_context(store);
    provide_context(legend);
    provide_context(ControlsVisible(controls_visible));

    // The container exists once the view is mounted.
    Effect::new(move || session::mount_map(store, legend));

    view! {
        <div id=MAP_CONTAINER_ID></div>
        <div class="controls">
            <PanelToggle />
            <div class=move || {
                if controls_visible.get() { "controls-content" } else { "controls-content d-none" }
            }>
                <LayerSelect />
                <OpacitySlider />
                <BasemapRadios />
                <LegendPanel />
            </div>
        </div>
    }
}

/// Collapse button for the controls panel, with a one-time hint.
#[component]
fn PanelToggle() -> impl IntoView {
    let ControlsVisible(visible) = expect_context();
    let hint = RwSignal::new(onboarding::claim_first_visit());

    Effect::new(move || {
        if hint.get_untracked() {
            Timeout::new(onboarding::TOOLTIP_VISIBLE_MS, move || hint.set(false)).forget();
        }
    });

    view! {
        <button
            id="toggleControls"
            class=move || if visible.get() { "btn btn-sm btn-light" } else { "btn btn-sm btn-light hidden" }
            title=move || if visible.get() { "Nascondi la legenda" } else { "Mostra la legenda" }
            on:click=move |_| {
                visible.update(|v| *v = !*v);
                hint.set(false);
            }
        >
            {move || if visible.get() { "Nascondi" } else { "Mostra legenda" }}
        </button>
        <Show when=move || hint.get()>
            <div class="controls-tooltip" role="tooltip">{onboarding::TOOLTIP_TEXT}</div>
        </Show>
    }
}

#[component]
fn LayerSelect() -> impl IntoView {
    let store: SessionStore = expect_context();
    let legend: ActiveLegend = expect_context();
    let selection = RwSignal::new(store.0.with_value(|s| s.viewer().selection()));

    view! {
        <label for="layerSelect" class="form-label">"Layer"</label>
        <select
            id="layerSelect"
            class="form-select form-select-sm mb-2"
            on:change=move |ev| {
                let Some(choice) = LayerChoice::from_value(&event_target_value(&ev)) else {
                    return;
                };
                selection.set(choice);
                session::dispatch(store, legend, ControlCommand::SelectLayer(choice));
            }
        >
            {LayerChoice::all()
                .map(|choice| {
                    view! {
                        <option value=choice.value() selected=move || selection.get() == choice>
                            {choice.label()}
                        </option>
                    }
                })
                .collect_view()}
        </select>
    }
}

#[component]
fn OpacitySlider() -> impl IntoView {
    let store: SessionStore = expect_context();
    let legend: ActiveLegend = expect_context();
    let opacity = RwSignal::new(store.0.with_value(|s| s.viewer().opacity()));

    view! {
        <label for="opacityRange" class="form-label">"Opacità"</label>
        <input
            type="range"
            id="opacityRange"
            class="form-range mb-2"
            min="0"
            max="1"
            step="0.05"
            prop:value=move || opacity.get().to_string()
            on:input=move |ev| {
                let Ok(value) = event_target_value(&ev).parse::<f64>() else {
                    return;
                };
                opacity.set(value);
                session::dispatch(store, legend, ControlCommand::SetOpacity(value));
            }
        />
    }
}

#[component]
fn BasemapRadios() -> impl IntoView {
    let store: SessionStore = expect_context();
    let legend: ActiveLegend = expect_context();
    let current = RwSignal::new(store.0.with_value(|s| s.viewer().basemap()));

    view! {
        <div class="mb-2">
            {Basemap::ALL
                .into_iter()
                .map(|basemap| {
                    view! {
                        <label class="form-check">
                            <input
                                type="radio"
                                name="basemap"
                                class="form-check-input"
                                value=basemap.value()
                                prop:checked=move || current.get() == basemap
                                on:change=move |_| {
                                    current.set(basemap);
                                    session::dispatch(store, legend, ControlCommand::SetBasemap(basemap));
                                }
                            />
                            <span class="form-check-label">{basemap.label()}</span>
                        </label>
                    }
                })
                .collect_view()}
        </div>
    }
}

/// Title, description and one swatch row per class of the active layer.
#[component]
fn LegendPanel() -> impl IntoView {
    let ActiveLegend(legend) = expect_context();

    view! {
        <div id="legend">
            {move || {
                legend
                    .get()
                    .map(|legend| {
                        view! {
                            <strong>{legend.title}</strong>
                            <div class="mb-2">{legend.description}</div>
                            {legend
                                .rows
                                .into_iter()
                                .map(|row| {
                                    view! {
                                        <div>
                                            <span
                                                class="legend-color"
                                                style=format!("background:{}", row.color)
                                            ></span>
                                            {row.label.into_owned()}
                                        </div>
                                    }
                                })
                                .collect_view()}
                        }
                    })
            }}
        </div>
    }
}

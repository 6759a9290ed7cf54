use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window,
};

use super::config::EngineConfig;
use super::error::CanvasError;
use super::interaction::{Gesture, InteractionEvent};
use super::state::GraphEngine;
use super::surface::Point;
use super::types::{GraphData, GraphLink, NodeId, UiState};

/// Milliseconds on the same clock as `requestAnimationFrame` timestamps.
fn now() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or_default()
}

fn local_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> Point {
	let rect = canvas.get_bounding_client_rect();
	Point::new(
		f64::from(client_x) - rect.left(),
		f64::from(client_y) - rect.top(),
	)
}

fn touch_points(ev: &TouchEvent, canvas: &HtmlCanvasElement) -> Vec<Point> {
	let touches = ev.touches();
	(0..touches.length())
		.filter_map(|i| touches.get(i))
		.map(|t| local_point(canvas, t.client_x(), t.client_y()))
		.collect()
}

fn window_size(window: &Window) -> Result<(f64, f64), CanvasError> {
	Ok((
		window.inner_width()?.as_f64().unwrap_or(800.0),
		window.inner_height()?.as_f64().unwrap_or(600.0),
	))
}

#[derive(Clone, Copy)]
struct Sizing {
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
}

impl Sizing {
	fn measure(&self, window: &Window, canvas: &HtmlCanvasElement) -> Result<(f64, f64), CanvasError> {
		if self.fullscreen {
			return window_size(window);
		}
		let parent = canvas.parent_element();
		Ok((
			self.width.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			self.height.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		))
	}
}

struct Host {
	engine: GraphEngine,
	canvas: HtmlCanvasElement,
	context: CanvasRenderingContext2d,
}

/// Shared slots for the live engine and the browser callbacks driving it.
#[derive(Clone, Default)]
struct Handles {
	host: Rc<RefCell<Option<Host>>>,
	frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
	frame_id: Rc<Cell<Option<i32>>>,
	resize: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl Handles {
	/// Runs `f` against the live engine. Returns `None` once torn down.
	fn with_host<R>(&self, f: impl FnOnce(&mut Host) -> R) -> Option<R> {
		let mut slot = self.host.try_borrow_mut().ok()?;
		slot.as_mut().map(f)
	}

	fn attach(
		&self,
		canvas: &HtmlCanvasElement,
		data: &GraphData,
		config: EngineConfig,
		sizing: Sizing,
		read_ui: impl Fn() -> UiState + 'static,
	) -> Result<(), CanvasError> {
		let window = web_sys::window().ok_or(CanvasError::NoWindow)?;
		let (w, h) = sizing.measure(&window, canvas)?;
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		let context: CanvasRenderingContext2d = canvas
			.get_context("2d")?
			.ok_or(CanvasError::NoContext)?
			.dyn_into()
			.map_err(|_| CanvasError::NoContext)?;

		*self.host.borrow_mut() = Some(Host {
			engine: GraphEngine::new(data, w, h, config),
			canvas: canvas.clone(),
			context,
		});

		if sizing.fullscreen {
			let handles = self.clone();
			let on_resize = Closure::<dyn FnMut()>::new(move || handles.resize_to_window());
			window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
			*self.resize.borrow_mut() = Some(on_resize);
		}

		let handles = self.clone();
		*self.frame.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			handles.on_frame(timestamp, &read_ui)
		}));
		self.request_frame();
		Ok(())
	}

	fn request_frame(&self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		let Ok(slot) = self.frame.try_borrow() else {
			return;
		};
		if let Some(ref cb) = *slot {
			match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				Ok(id) => self.frame_id.set(Some(id)),
				Err(err) => error!("requestAnimationFrame failed: {:?}", err),
			}
		}
	}

	fn on_frame(&self, timestamp: f64, read_ui: &dyn Fn() -> UiState) {
		self.frame_id.set(None);
		let live = match self.host.try_borrow_mut() {
			Ok(mut slot) => match slot.as_mut() {
				Some(host) if host.canvas.is_connected() => {
					host.engine.set_ui_state(read_ui());
					host.engine.frame(&mut host.context, timestamp);
					host.engine.is_live()
				}
				Some(host) => {
					host.engine.teardown();
					false
				}
				None => false,
			},
			Err(_) => true,
		};
		if live {
			self.request_frame();
		}
	}

	fn resize_to_window(&self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = match window_size(&window) {
			Ok(size) => size,
			Err(err) => {
				warn!("ignoring resize: {}", err);
				return;
			}
		};
		self.with_host(|host| {
			host.canvas.set_width(w as u32);
			host.canvas.set_height(h as u32);
			host.engine.resize(w, h);
		});
	}

	/// Stops the engine and unhooks every browser callback. Safe to repeat.
	fn teardown(&self) {
		if let Ok(mut slot) = self.host.try_borrow_mut() {
			if let Some(mut host) = slot.take() {
				host.engine.teardown();
			}
		}
		if let Some(window) = web_sys::window() {
			if let Some(id) = self.frame_id.take() {
				if let Err(err) = window.cancel_animation_frame(id) {
					warn!("cancelAnimationFrame failed: {:?}", err);
				}
			}
			if let Some(on_resize) = self.resize.borrow_mut().take() {
				let _ = window
					.remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
			}
		}
		self.frame.borrow_mut().take();
	}
}

/// Canvas view of a concept hierarchy with a live force layout.
///
/// `selected`, `hovered`, `flagged` and `cross_links` are sampled once per
/// animation frame without subscribing. A new `data` value rebuilds the engine.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] on_select: Callback<Option<NodeId>>,
	#[prop(optional, into)] on_hover: Option<Callback<Option<NodeId>>>,
	#[prop(into, default = Signal::stored(Vec::new()))] cross_links: Signal<Vec<GraphLink>>,
	#[prop(into, default = Signal::stored(None))] selected: Signal<Option<NodeId>>,
	#[prop(into, default = Signal::stored(None))] hovered: Signal<Option<NodeId>>,
	#[prop(into, default = Signal::stored(HashSet::new()))] flagged: Signal<HashSet<NodeId>>,
	#[prop(into, default = Signal::stored(None))] focus: Signal<Option<NodeId>>,
	#[prop(optional)] config: EngineConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let handles = Handles::default();
	let sizing = Sizing {
		fullscreen,
		width,
		height,
	};

	let read_ui = move || UiState {
		selected: selected.try_get_untracked().flatten(),
		hovered: hovered.try_get_untracked().flatten(),
		flagged: flagged.try_get_untracked().unwrap_or_default(),
		cross_links: cross_links.try_get_untracked().unwrap_or_default(),
	};

	let dispatch = move |event: Option<InteractionEvent>| match event {
		Some(InteractionEvent::SelectionChanged(id)) => on_select.run(id),
		Some(InteractionEvent::HoverChanged(id)) => {
			if let Some(on_hover) = on_hover {
				on_hover.run(id);
			}
		}
		None => {}
	};

	let handles_mount = handles.clone();
	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		handles_mount.teardown();
		match handles_mount.attach(&canvas, &graph, config.clone(), sizing, read_ui) {
			Ok(()) => debug!("force graph mounted with {} nodes", graph.nodes.len()),
			Err(err) => error!("force graph unavailable: {}", err),
		}
	});

	let handles_focus = handles.clone();
	Effect::new(move |_| {
		if let Some(id) = focus.get() {
			handles_focus.with_host(|host| host.engine.focus_on(id, now()));
		}
	});

	let stored = StoredValue::new_local(handles.clone());
	on_cleanup(move || {
		stored.try_with_value(Handles::teardown);
	});

	let handles_md = handles.clone();
	let on_mousedown = move |ev: MouseEvent| {
		handles_md.with_host(|host| {
			let at = local_point(&host.canvas, ev.client_x(), ev.client_y());
			host.engine.pointer_down(at, now());
		});
	};

	let handles_mm = handles.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let event = handles_mm.with_host(|host| {
			let at = local_point(&host.canvas, ev.client_x(), ev.client_y());
			host.engine.pointer_move(at, now())
		});
		dispatch(event.flatten());
	};

	let handles_mu = handles.clone();
	let on_mouseup = move |_: MouseEvent| {
		let event = handles_mu.with_host(|host| host.engine.pointer_up());
		dispatch(event.flatten());
	};

	let handles_ml = handles.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let event = handles_ml.with_host(|host| host.engine.pointer_cancel());
		dispatch(event.flatten());
	};

	let handles_wh = handles.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		handles_wh.with_host(|host| {
			let at = local_point(&host.canvas, ev.client_x(), ev.client_y());
			host.engine.wheel(at, ev.delta_y(), now());
		});
	};

	let handles_ts = handles.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		handles_ts.with_host(|host| match touch_points(&ev, &host.canvas).as_slice() {
			[single] => host.engine.pointer_down(*single, now()),
			[a, b, ..] => host.engine.pinch_start(*a, *b),
			[] => {}
		});
	};

	let handles_tm = handles.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let event = handles_tm.with_host(|host| match touch_points(&ev, &host.canvas).as_slice() {
			[single] => host.engine.pointer_move(*single, now()),
			[a, b, ..] => {
				host.engine.pinch_move(*a, *b, now());
				None
			}
			[] => None,
		});
		dispatch(event.flatten());
	};

	// A pinch that drops to one finger ends without becoming a click.
	let handles_te = handles.clone();
	let on_touchend = move |ev: TouchEvent| {
		ev.prevent_default();
		let event = handles_te.with_host(|host| {
			let remaining = touch_points(&ev, &host.canvas).len();
			let pinching = matches!(host.engine.gesture(), Gesture::Pinching { .. });
			if remaining == 0 || (remaining == 1 && pinching) {
				host.engine.pointer_up()
			} else {
				None
			}
		});
		dispatch(event.flatten());
	};

	let handles_tc = handles;
	let on_touchcancel = move |_: TouchEvent| {
		let event = handles_tc.with_host(|host| host.engine.pointer_cancel());
		dispatch(event.flatten());
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			on:touchcancel=on_touchcancel
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}

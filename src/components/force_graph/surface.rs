//! Drawing backend seam between the renderer and whatever paints pixels.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::transform::ViewTransform;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}

	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Rgba {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const TRANSPARENT: Rgba = Rgba {
		r: 0,
		g: 0,
		b: 0,
		a: 0.0,
	};

	pub fn with_alpha(self, a: f64) -> Self {
		Self {
			a: a.clamp(0.0, 1.0),
			..self
		}
	}

	pub fn to_css(&self) -> String {
		format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
	pub offset: f64,
	pub color: Rgba,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
	Solid(Rgba),
	/// Linear gradient spanning the stroked path from its start to its end point.
	Gradient(Vec<GradientStop>),
}

/// Stroke parameters in world units.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
	pub paint: Paint,
	pub width: f64,
	/// Dash and gap lengths.
	pub dash: Option<(f64, f64)>,
}

impl StrokeStyle {
	pub fn solid(color: Rgba, width: f64) -> Self {
		Self {
			paint: Paint::Solid(color),
			width,
			dash: None,
		}
	}
}

/// Shadow around a filled shape. `blur` is in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
	pub color: Rgba,
	pub blur: f64,
}

/// Everything the renderer needs from a backend. Coordinates passed after
/// `set_view` are world coordinates.
pub trait Surface {
	fn clear(&mut self, width: f64, height: f64, color: Rgba);
	fn set_view(&mut self, transform: &ViewTransform);
	fn reset_view(&mut self);
	fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle);
	fn stroke_curve(&mut self, from: Point, control: Point, to: Point, style: &StrokeStyle);
	fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, width: f64);
	fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba, glow: Option<Glow>);
	fn draw_text(&mut self, text: &str, at: Point, font_size: f64, color: Rgba);
}

impl Surface for CanvasRenderingContext2d {
	fn clear(&mut self, width: f64, height: f64, color: Rgba) {
		let _ = self.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
		self.set_fill_style_str(&color.to_css());
		self.fill_rect(0.0, 0.0, width, height);
	}

	fn set_view(&mut self, transform: &ViewTransform) {
		let _ = self.set_transform(transform.k, 0.0, 0.0, transform.k, transform.x, transform.y);
	}

	fn reset_view(&mut self) {
		let _ = self.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
	}

	fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) {
		apply_stroke(self, from, to, style);
		self.begin_path();
		self.move_to(from.x, from.y);
		self.line_to(to.x, to.y);
		self.stroke();
		let _ = self.set_line_dash(&js_sys::Array::new());
	}

	fn stroke_curve(&mut self, from: Point, control: Point, to: Point, style: &StrokeStyle) {
		apply_stroke(self, from, to, style);
		self.begin_path();
		self.move_to(from.x, from.y);
		self.quadratic_curve_to(control.x, control.y, to.x, to.y);
		self.stroke();
		let _ = self.set_line_dash(&js_sys::Array::new());
	}

	fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, width: f64) {
		self.begin_path();
		let _ = self.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
		self.set_stroke_style_str(&color.to_css());
		self.set_line_width(width);
		self.stroke();
	}

	fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba, glow: Option<Glow>) {
		if let Some(glow) = glow {
			self.set_shadow_color(&glow.color.to_css());
			self.set_shadow_blur(glow.blur);
		}
		self.begin_path();
		let _ = self.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
		self.set_fill_style_str(&color.to_css());
		self.fill();
		if glow.is_some() {
			self.set_shadow_blur(0.0);
			self.set_shadow_color("transparent");
		}
	}

	fn draw_text(&mut self, text: &str, at: Point, font_size: f64, color: Rgba) {
		self.set_fill_style_str(&color.to_css());
		self.set_font(&format!("{}px sans-serif", font_size));
		self.set_text_align("center");
		self.set_text_baseline("middle");
		let _ = self.fill_text(text, at.x, at.y);
	}
}

fn apply_stroke(ctx: &CanvasRenderingContext2d, from: Point, to: Point, style: &StrokeStyle) {
	match &style.paint {
		Paint::Solid(color) => ctx.set_stroke_style_str(&color.to_css()),
		Paint::Gradient(stops) => {
			let gradient = ctx.create_linear_gradient(from.x, from.y, to.x, to.y);
			for stop in stops {
				let _ = gradient.add_color_stop(stop.offset as f32, &stop.color.to_css());
			}
			#[allow(deprecated)]
			ctx.set_stroke_style(&gradient);
		}
	}
	ctx.set_line_width(style.width);
	if let Some((dash, gap)) = style.dash {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
	}
}

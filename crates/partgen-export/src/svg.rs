//! SVG drawing surface: a typed element tree that every view renders into.
//!
//! Coordinates are stored as given (renderers round them through the board's
//! precision) and printed in shortest round-trip form.

use partgen_core::Unit;

use crate::xml::XmlElement;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub id: Option<String>,
    pub class: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: String,
    pub stroke: Option<Stroke>,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64, fill: impl Into<String>) -> Self {
        Self {
            id: None,
            class: None,
            x,
            y,
            width,
            height,
            fill: fill.into(),
            stroke: None,
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    #[must_use]
    pub fn stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(stroke);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub id: Option<String>,
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fill: String,
    pub stroke: Stroke,
    pub connector_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub id: Option<String>,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: Stroke,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub fill: String,
    pub font_family: String,
    pub font_size: f64,
    pub anchor: TextAnchor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SvgNode {
    Group(Group),
    Rect(Rect),
    Circle(Circle),
    Path { fill: String, d: String },
    Line(Line),
    Text(Text),
}

impl SvgNode {
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            SvgNode::Group(g) => g.id.as_deref(),
            SvgNode::Rect(r) => r.id.as_deref(),
            SvgNode::Circle(c) => c.id.as_deref(),
            SvgNode::Line(l) => l.id.as_deref(),
            SvgNode::Path { .. } | SvgNode::Text(_) => None,
        }
    }

    fn to_xml(&self) -> XmlElement {
        match self {
            SvgNode::Group(g) => {
                let mut el = XmlElement::new("g");
                if let Some(id) = &g.id {
                    el.set_attr("id", id);
                }
                el.children = g.children.iter().map(SvgNode::to_xml).collect();
                el
            }
            SvgNode::Rect(r) => {
                let mut el = XmlElement::new("rect");
                if let Some(id) = &r.id {
                    el.set_attr("id", id);
                }
                if let Some(class) = &r.class {
                    el.set_attr("class", class);
                }
                let mut el = el
                    .attr("x", fmt_num(r.x))
                    .attr("y", fmt_num(r.y))
                    .attr("width", fmt_num(r.width))
                    .attr("height", fmt_num(r.height))
                    .attr("fill", &r.fill);
                if let Some(stroke) = &r.stroke {
                    el.set_attr("stroke", &stroke.color);
                    el.set_attr("stroke-width", fmt_num(stroke.width));
                }
                el
            }
            SvgNode::Circle(c) => {
                let mut el = XmlElement::new("circle");
                if let Some(id) = &c.id {
                    el.set_attr("id", id);
                }
                if let Some(name) = &c.connector_name {
                    el.set_attr("connectorname", name);
                }
                el.attr("cx", fmt_num(c.cx))
                    .attr("cy", fmt_num(c.cy))
                    .attr("r", fmt_num(c.r))
                    .attr("fill", &c.fill)
                    .attr("stroke", &c.stroke.color)
                    .attr("stroke-width", fmt_num(c.stroke.width))
            }
            SvgNode::Path { fill, d } => XmlElement::new("path").attr("fill", fill).attr("d", d),
            SvgNode::Line(l) => {
                let mut el = XmlElement::new("line");
                if let Some(id) = &l.id {
                    el.set_attr("id", id);
                }
                el.attr("x1", fmt_num(l.x1))
                    .attr("y1", fmt_num(l.y1))
                    .attr("x2", fmt_num(l.x2))
                    .attr("y2", fmt_num(l.y2))
                    .attr("stroke", &l.stroke.color)
                    .attr("stroke-width", fmt_num(l.stroke.width))
            }
            SvgNode::Text(t) => XmlElement::new("text")
                .attr("x", fmt_num(t.x))
                .attr("y", fmt_num(t.y))
                .attr("fill", &t.fill)
                .attr("font-family", &t.font_family)
                .attr("font-size", fmt_num(t.font_size))
                .attr("text-anchor", t.anchor.as_str())
                .with_text(&t.text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub id: Option<String>,
    pub children: Vec<SvgNode>,
}

impl Group {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            children: Vec::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: impl Into<SvgNode>) {
        self.children.push(node.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

macro_rules! node_from {
    ($($ty:ident),*) => {
        $(impl From<$ty> for SvgNode {
            fn from(value: $ty) -> Self {
                SvgNode::$ty(value)
            }
        })*
    };
}

node_from!(Group, Rect, Circle, Line, Text);

/// One SVG file. Width and height are in `unit`; the view box uses the same
/// numbers so user units equal physical units.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    pub width: f64,
    pub height: f64,
    pub unit: Unit,
    pub enable_background: bool,
    pub children: Vec<SvgNode>,
}

impl SvgDocument {
    pub fn new(width: f64, height: f64, unit: Unit) -> Self {
        Self {
            width,
            height,
            unit,
            enable_background: false,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_enable_background(mut self) -> Self {
        self.enable_background = true;
        self
    }

    pub fn push(&mut self, node: impl Into<SvgNode>) {
        self.children.push(node.into());
    }

    /// Every `id` in the document, in document order.
    #[must_use]
    pub fn element_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        let mut stack: Vec<&SvgNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if let Some(id) = node.id() {
                ids.push(id);
            }
            if let SvgNode::Group(g) = node {
                stack.extend(g.children.iter().rev());
            }
        }
        ids
    }

    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.element_ids().contains(&id)
    }

    #[must_use]
    pub fn to_xml(&self) -> XmlElement {
        let suffix = self.unit.suffix();
        let w = fmt_num(self.width);
        let h = fmt_num(self.height);
        let mut root = XmlElement::new("svg")
            .attr("version", "1.1")
            .attr("id", "Layer_1")
            .attr("xmlns", SVG_NS)
            .attr("xmlns:xlink", XLINK_NS)
            .attr("x", format!("0{suffix}"))
            .attr("y", format!("0{suffix}"))
            .attr("width", format!("{w}{suffix}"))
            .attr("height", format!("{h}{suffix}"))
            .attr("viewBox", format!("0 0 {w} {h}"));
        if self.enable_background {
            root.set_attr("enable-background", format!("new 0 0 {w} {h}"));
        }
        root.children = self.children.iter().map(SvgNode::to_xml).collect();
        root
    }
}

/// Shortest decimal form of `v`, without a trailing `.0`.
pub fn fmt_num(v: f64) -> String {
    let v = if v.abs() < 1e-9 { 0.0 } else { v };
    let mut buf = ryu::Buffer::new();
    let s = buf.format(v);
    s.strip_suffix(".0").unwrap_or(s).to_string()
}

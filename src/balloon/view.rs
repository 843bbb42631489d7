use super::model::{BalloonNodes, Placement};
use crate::config::{Options, Prefix};
use crate::geometry::{self, Position};
use crate::host::{Host, NodeId, Size};
use crate::hover::SizeStyle;
use crate::style::Style;

/// Structural nodes every balloon hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub container: NodeId,
    pub wrapper: NodeId,
    pub root: NodeId,
    pub center: Option<NodeId>,
}

fn zero_box(position: &str) -> Style {
    Style::new()
        .with("position", position)
        .with("width", 0)
        .with("height", 0)
}

fn create(
    host: &dyn Host,
    parent: NodeId,
    prefix: &Prefix,
    suffix: Option<&str>,
    style: &Style,
) -> NodeId {
    let node = host.create_node(&prefix.class(suffix));
    host.apply_style(node, style);
    host.append(parent, node);
    node
}

/// Builds the container, the wrapper centered on `parent` and the root balloons attach to.
pub fn build_anchor(host: &dyn Host, parent: NodeId, prefix: &Prefix, size: Size) -> Anchor {
    let container = create(
        host,
        parent,
        prefix,
        Some("container"),
        &zero_box("relative").with("display", "block"),
    );
    let wrapper = create(
        host,
        parent,
        prefix,
        Some("wrapper"),
        &zero_box("absolute")
            .with("display", "block")
            .with("left", size.width / 2.0)
            .with("top", size.height / 2.0),
    );
    let root = create(host, wrapper, prefix, Some("container"), &zero_box("relative"));

    Anchor {
        container,
        wrapper,
        root,
        center: None,
    }
}

/// Marker of diameter `radius` centered on the anchor.
pub fn build_center(host: &dyn Host, root: NodeId, options: &Options, radius: f64) -> NodeId {
    let style = options.center_css.merged(
        &Style::new()
            .with("position", "absolute")
            .with("border-radius", radius / 2.0)
            .with("left", -radius / 2.0)
            .with("top", -radius / 2.0)
            .with("width", radius)
            .with("height", radius),
    );
    create(host, root, &options.prefix, Some("center"), &style)
}

pub fn position_style(position: Position) -> Style {
    Style::new()
        .with("left", position.x)
        .with("top", position.y)
}

fn container_style(position: Position) -> Style {
    zero_box("absolute")
        .with("display", "block")
        .merged(&position_style(position))
}

/// Turns the content so it points at the anchor, with a matrix filter for renderers that
/// lack transforms.
pub fn rotation_style(angle_degrees: f64) -> Style {
    let rotation = geometry::content_rotation(angle_degrees);
    let transform = format!("rotate({rotation}deg)");
    let [m11, m12, m21, m22] = geometry::rotation_matrix(rotation);

    Style::new()
        .with("-webkit-transform", transform.as_str())
        .with("-moz-transform", transform.as_str())
        .with("-o-transform", transform.as_str())
        .with("transform", transform)
        .with(
            "filter",
            format!(
                "progid:DXImageTransform.Microsoft.Matrix(M11={m11}, M12={m12}, M21={m21}, M22={m22}, SizingMethod=\"original\")"
            ),
        )
        .with("zoom", 1)
}

/// Global balloon style, then the balloon's own overrides, then the size-derived layout.
/// The inner node starts hidden.
pub fn inner_style(options: &Options, placement: &Placement, css: &Style) -> Style {
    let r = placement.balloon_radius;
    let mut style = options.balloon_css.merged(css).merged(
        &Style::new()
            .with("display", "none")
            .with("line-height", format!("{r}px")),
    );
    // must use the keys the hover expander animates
    style.merge(
        &SizeStyle::for_radius(r)
            .bordered(options.border.is_some())
            .to_style(),
    );

    if let Some(border) = &options.border {
        style.set("border", border.as_str());
    }

    if options.rotate_content {
        style.merge(&rotation_style(placement.angle_degrees));
    }

    style
}

/// Creates the positioned container and the styled inner node of one balloon.
pub fn render(
    host: &dyn Host,
    root: NodeId,
    options: &Options,
    placement: &Placement,
    style: &Style,
) -> BalloonNodes {
    let container = create(
        host,
        root,
        &options.prefix,
        None,
        &container_style(placement.position),
    );
    let inner = host.create_node(&options.prefix.class(Some("inner")));
    host.apply_style(inner, style);
    host.set_content(
        inner,
        &options
            .content
            .render(placement.angle_degrees, placement.index),
    );
    host.append(container, inner);

    BalloonNodes { container, inner }
}

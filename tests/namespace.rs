use relay_dom::vnode::Namespace;

#[test]
fn svg_and_math_open_their_namespace() {
	assert_eq!(Namespace::of_element("svg", Namespace::Html), Namespace::Svg);
	assert_eq!(Namespace::of_element("math", Namespace::Html), Namespace::MathMl);
	assert_eq!(Namespace::of_element("div", Namespace::Html), Namespace::Html);
}

#[test]
fn descendants_inherit_the_namespace() {
	let svg = Namespace::of_element("svg", Namespace::Html);
	let defs = Namespace::of_element("defs", svg.for_children("svg"));
	let gradient = Namespace::of_element("linearGradient", defs.for_children("defs"));

	assert_eq!(gradient, Namespace::Svg);
	assert_eq!(Namespace::of_element("mi", Namespace::MathMl.for_children("math")), Namespace::MathMl);
}

#[test]
fn foreign_object_children_are_html_again() {
	let foreign = Namespace::of_element("foreignObject", Namespace::Svg);

	assert_eq!(foreign, Namespace::Svg);
	assert_eq!(Namespace::of_element("p", foreign.for_children("foreignObject")), Namespace::Html);
}

#[test]
fn uris_round_trip_and_default_to_html() {
	for namespace in [Namespace::Html, Namespace::Svg, Namespace::MathMl] {
		assert_eq!(Namespace::from_uri(Some(namespace.uri())), namespace);
	}
	assert_eq!(Namespace::from_uri(None), Namespace::Html);
	assert_eq!(Namespace::from_uri(Some("urn:unknown")), Namespace::Html);
}

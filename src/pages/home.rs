use std::collections::HashSet;

use leptos::prelude::*;
use log::debug;

use crate::components::force_graph::{ForceGraphCanvas, GraphData, GraphLink, GraphNode, NodeId};

const TOPICS: &[&str] = &[
	"Sets", "Logic", "Algebra", "Groups", "Rings", "Fields", "Vectors", "Matrices", "Limits",
	"Series", "Graphs", "Proofs", "Measure", "Topology",
];

/// Generate a concept hierarchy: a random tree rooted at node 0 with depths and child lists.
fn generate_concept_tree(n: usize) -> GraphData {
	let mut nodes = vec![GraphNode {
		id: 0,
		name: "Mathematics".into(),
		depth: 0,
		children: Vec::new(),
	}];
	let mut links = Vec::with_capacity(n.saturating_sub(1));

	for i in 1..n {
		let parent = (rand_simple(i) * (i as f64)) as usize;
		let depth = nodes[parent].depth + 1;
		nodes[parent].children.push(i as NodeId);
		nodes.push(GraphNode {
			id: i as NodeId,
			name: format!("{} {}", TOPICS[i % TOPICS.len()], i),
			depth,
			children: Vec::new(),
		});
		links.push(GraphLink::new(parent as NodeId, i as NodeId));
	}

	GraphData { nodes, links }
}

/// A handful of links across branches of the tree.
fn sample_cross_links(n: usize) -> Vec<GraphLink> {
	[(3, 17), (8, 41), (12, 29), (22, 55)]
		.into_iter()
		.filter(|&(a, b)| a < n && b < n)
		.map(|(a, b)| GraphLink::new(a as NodeId, b as NodeId))
		.collect()
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	const SIZE: usize = 80;

	let graph_data = Signal::stored(generate_concept_tree(SIZE));
	let cross_links = RwSignal::new(sample_cross_links(SIZE));
	let selected = RwSignal::new(None::<NodeId>);
	let hovered = RwSignal::new(None::<NodeId>);
	let flagged = RwSignal::new([5, 17, 33].into_iter().collect::<HashSet<NodeId>>());
	let focus = RwSignal::new(None::<NodeId>);

	// Selecting a flagged concept acknowledges it.
	let on_select = move |id: Option<NodeId>| {
		debug!("selected {:?}", id);
		selected.set(id);
		if let Some(id) = id {
			flagged.update(|f| {
				f.remove(&id);
			});
		}
	};
	let on_hover = move |id: Option<NodeId>| hovered.set(id);

	let selected_name = move || {
		selected.get().and_then(|id| {
			graph_data.with(|g| g.nodes.iter().find(|n| n.id == id).map(|n| n.name.clone()))
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas
					data=graph_data
					cross_links=cross_links
					selected=selected
					hovered=hovered
					flagged=flagged
					focus=focus
					on_select=on_select
					on_hover=on_hover
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Concept Graph"</h1>
					<p class="subtitle">
						"Click a concept to select it. Drag to move. Scroll or pinch to zoom."
					</p>
					<p class="selection">
						{move || selected_name().unwrap_or_else(|| "Nothing selected".into())}
					</p>
					<button
						disabled=move || selected.get().is_none()
						on:click=move |_| focus.set(selected.get_untracked())
					>
						"Focus selected"
					</button>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn concept_tree_is_consistent() {
		let data = generate_concept_tree(80);
		assert_eq!(data.nodes.len(), 80);
		assert_eq!(data.links.len(), 79);
		for link in &data.links {
			let parent = &data.nodes[link.source as usize];
			let child = &data.nodes[link.target as usize];
			assert!(link.source < link.target);
			assert!(parent.children.contains(&child.id));
			assert_eq!(child.depth, parent.depth + 1);
		}
	}

	#[test]
	fn cross_links_stay_in_range() {
		assert_eq!(sample_cross_links(80).len(), 4);
		assert!(sample_cross_links(20).iter().all(|l| l.source < 20 && l.target < 20));
	}
}

//! The diagram synthesizer: lowers a flow's component tree into PlantUML
//! activity-diagram text.
//!
//! Each `render` call is a pure function of (flow, index, options); the
//! only shared state is the icon disk cache, whose population is
//! idempotent. Rendering different flows concurrently is safe.

mod icons;

pub use icons::{DEFAULT_ICON, EmbeddedIconStore, IconResolver, IconStore};

use crate::model::{Component, Flow};
use ahash::{AHashMap, AHashSet};

/// Rendering policy switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Label leaves with the full qualified type instead of the local
    /// name.
    pub full_names: bool,
    /// Elide everything without reachable integration content.
    pub integration_only: bool,
}

/// Project-wide flow name → flow index used to follow flow-refs.
pub type FlowIndex<'a> = AHashMap<String, &'a Flow>;

/// Builds the flow index the synthesizer consumes. Duplicate flow names
/// keep the last declaration, mirroring the config index.
pub fn build_flow_index<'a>(flows: impl IntoIterator<Item = &'a Flow>) -> FlowIndex<'a> {
    flows.into_iter().map(|flow| (flow.name.clone(), flow)).collect()
}

/// Lowers flows to activity-diagram text.
#[derive(Default)]
pub struct DiagramSynthesizer {
    icons: IconResolver,
}

struct RenderContext<'a> {
    max_depth: Option<usize>,
    options: RenderOptions,
    flows: &'a FlowIndex<'a>,
}

impl DiagramSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_icon_store(store: Box<dyn IconStore>) -> Self {
        Self {
            icons: IconResolver::with_store(store),
        }
    }

    /// Renders one flow. `max_depth` limits nesting (`None` = unlimited,
    /// `Some(0)` = roots only); flow-refs are expanded through `flows`
    /// with a per-path cycle guard.
    pub fn render(
        &self,
        flow: &Flow,
        max_depth: Option<usize>,
        options: RenderOptions,
        flows: &FlowIndex,
    ) -> String {
        let mut out = String::with_capacity(512);
        out.push_str("@startuml\n");
        out.push_str("skinparam shadowing false\n");
        out.push_str("skinparam activity {\n");
        out.push_str("  BackgroundColor #E6E6FA\n");
        out.push_str("  BorderColor #663399\n");
        out.push_str("  ArrowColor #663399\n");
        out.push_str("}\n");
        out.push_str("start\n");

        let ctx = RenderContext {
            max_depth,
            options,
            flows,
        };
        let mut visited = AHashSet::new();
        visited.insert(flow.name.clone());
        for root in &flow.roots {
            self.emit(&mut out, root, 0, &visited, &ctx, false);
        }

        out.push_str("stop\n");
        out.push_str("@enduml\n");
        out
    }

    /// Recursive descent over one component. `force` suppresses the
    /// depth gate for try error-handling subtrees.
    fn emit(
        &self,
        out: &mut String,
        comp: &Component,
        depth: usize,
        visited: &AHashSet<String>,
        ctx: &RenderContext,
        force: bool,
    ) {
        let t = comp.component_type.as_str();

        if ctx.options.integration_only
            && (is_choice(t) || is_fork(t) || is_wrapper(t) || is_flow_ref(t))
            && !has_integration_content(comp, ctx.flows, &mut AHashSet::new())
        {
            return;
        }

        if is_choice(t) {
            self.emit_choice(out, comp, depth, visited, ctx, force);
        } else if is_fork(t) {
            self.emit_fork(out, comp, depth, visited, ctx, force);
        } else if is_flow_ref(t) {
            self.emit_flow_ref(out, comp, depth, visited, ctx, force);
        } else if is_wrapper(t) {
            self.emit_wrapper(out, comp, depth, visited, ctx, force);
        } else {
            self.emit_leaf(out, comp, depth, visited, ctx, force);
        }
    }

    fn emit_choice(
        &self,
        out: &mut String,
        comp: &Component,
        depth: usize,
        visited: &AHashSet<String>,
        ctx: &RenderContext,
        force: bool,
    ) {
        let mut cases: Vec<&Component> = comp
            .children
            .iter()
            .filter(|c| {
                c.component_type.ends_with("when") || c.component_type.ends_with("otherwise")
            })
            .collect();
        if ctx.options.integration_only {
            cases.retain(|case| has_integration_content(case, ctx.flows, &mut AHashSet::new()));
        }

        out.push_str("switch (Choice)\n");
        if cases.is_empty() {
            out.push_str("case ( Empty )\n");
        } else {
            for case in cases {
                if case.component_type.ends_with("otherwise") {
                    out.push_str("case ( Default )\n");
                } else {
                    out.push_str("case ( When )\n");
                }
                for inner in &case.children {
                    self.emit(out, inner, depth + 1, visited, ctx, force);
                }
            }
        }
        out.push_str("endswitch\n");
    }

    fn emit_fork(
        &self,
        out: &mut String,
        comp: &Component,
        depth: usize,
        visited: &AHashSet<String>,
        ctx: &RenderContext,
        force: bool,
    ) {
        // Route children contribute their contents as one parallel
        // branch; direct children are a branch of their own.
        let mut branches: Vec<Vec<&Component>> = comp
            .children
            .iter()
            .map(|child| {
                if child.component_type.ends_with("route") {
                    child.children.iter().collect()
                } else {
                    vec![child]
                }
            })
            .collect();
        if ctx.options.integration_only {
            branches.retain(|branch| {
                branch
                    .iter()
                    .any(|c| has_integration_content(c, ctx.flows, &mut AHashSet::new()))
            });
            // A lone surviving branch renders inline, no fork block.
            if branches.len() == 1 {
                for inner in &branches[0] {
                    self.emit(out, inner, depth + 1, visited, ctx, force);
                }
                return;
            }
        }

        out.push_str("fork\n");
        for (i, branch) in branches.iter().enumerate() {
            if i > 0 {
                out.push_str("fork again\n");
            }
            for inner in branch {
                self.emit(out, inner, depth + 1, visited, ctx, force);
            }
        }
        out.push_str("end fork\n");
    }

    fn emit_wrapper(
        &self,
        out: &mut String,
        comp: &Component,
        depth: usize,
        visited: &AHashSet<String>,
        ctx: &RenderContext,
        force: bool,
    ) {
        let is_try = comp.component_type.ends_with("try");
        if comp.children.is_empty()
            || !(force || is_try || depth_allowed(depth, ctx.max_depth))
        {
            // Depth budget exhausted: the wrapper collapses to one line.
            self.emit_leaf_line(out, comp, ctx);
            return;
        }

        let marker = self.icons.marker(&comp.component_type);
        out.push_str(&format!(
            "partition \"{} {}\" {{\n",
            marker,
            wrapper_label(comp)
        ));
        for child in &comp.children {
            // Error handling inside a try must stay visible at any depth.
            let child_force =
                force || (is_try && child.component_type.ends_with("error-handler"));
            self.emit(out, child, depth + 1, visited, ctx, child_force);
        }
        out.push_str("}\n");
    }

    fn emit_flow_ref(
        &self,
        out: &mut String,
        comp: &Component,
        depth: usize,
        visited: &AHashSet<String>,
        ctx: &RenderContext,
        force: bool,
    ) {
        let Some(target) = comp.attribute("name").filter(|n| !n.is_empty()) else {
            self.emit_leaf_line(out, comp, ctx);
            return;
        };

        if visited.contains(target) {
            let marker = self.icons.marker(&comp.component_type);
            out.push_str(&format!(":{marker} {target} (recursive);\n"));
            return;
        }

        let expandable = force || depth_allowed(depth, ctx.max_depth);
        let marker = self.icons.marker(&comp.component_type);
        let (Some(target_flow), true) = (ctx.flows.get(target), expandable) else {
            // Unknown target or exhausted depth: reference label only.
            out.push_str(&format!(":{marker} Ref: {target};\n"));
            return;
        };

        out.push_str(&format!("partition \"{marker} Ref: {target}\" {{\n"));
        // Thread a copy of the visited set down this path only; sibling
        // references must not inherit it.
        let mut next_visited = visited.clone();
        next_visited.insert(target.to_string());
        for root in &target_flow.roots {
            self.emit(out, root, depth + 1, &next_visited, ctx, force);
        }
        out.push_str("}\n");
    }

    fn emit_leaf(
        &self,
        out: &mut String,
        comp: &Component,
        depth: usize,
        visited: &AHashSet<String>,
        ctx: &RenderContext,
        force: bool,
    ) {
        if ctx.options.integration_only && !is_integration_component(comp) {
            // Transparent: the element itself is elided, its children
            // are still traversed (error handlers and similar chains).
            for child in &comp.children {
                self.emit(out, child, depth, visited, ctx, force);
            }
            return;
        }

        self.emit_leaf_line(out, comp, ctx);
        if !comp.children.is_empty() && (force || depth_allowed(depth, ctx.max_depth)) {
            for child in &comp.children {
                self.emit(out, child, depth + 1, visited, ctx, force);
            }
        }
    }

    fn emit_leaf_line(&self, out: &mut String, comp: &Component, ctx: &RenderContext) {
        let marker = self.icons.marker(&comp.component_type);
        let label = leaf_label(comp, ctx.options);
        match &comp.connection_details {
            Some(details) => {
                out.push_str(&format!(
                    ":{marker} **{label}**\n<size:10>{details}</size>;\n"
                ));
            }
            None => {
                out.push_str(&format!(":{marker} {label};\n"));
            }
        }
    }
}

fn depth_allowed(depth: usize, max_depth: Option<usize>) -> bool {
    max_depth.is_none_or(|max| depth < max)
}

fn is_choice(t: &str) -> bool {
    t.ends_with("choice") || t.ends_with("router")
}

fn is_fork(t: &str) -> bool {
    t.ends_with("scatter-gather")
}

fn is_flow_ref(t: &str) -> bool {
    t.ends_with("flow-ref")
}

fn is_wrapper(t: &str) -> bool {
    t.ends_with("try")
        || t.ends_with("foreach")
        || t.ends_with("async")
        || t.ends_with("until-successful")
        || t.ends_with("transactional")
        || t.starts_with("batch:")
}

fn is_structural(t: &str) -> bool {
    is_choice(t)
        || is_fork(t)
        || is_wrapper(t)
        || is_flow_ref(t)
        || t.ends_with("when")
        || t.ends_with("otherwise")
        || t.ends_with("route")
        || t.ends_with("error-handler")
        || t.ends_with("on-error-continue")
        || t.ends_with("on-error-propagate")
}

/// Trigger/starter components always count as integration content.
fn is_trigger(t: &str) -> bool {
    t.ends_with("listener") || t == "scheduler" || t.ends_with(":scheduler")
}

/// Utility namespaces whose components never count as connectors.
const NON_CONNECTOR_NAMESPACES: [&str; 5] = ["ee", "dw", "validation", "tracking", "scripting"];

fn is_config_type(t: &str) -> bool {
    t.ends_with("-config") || t.ends_with(":config")
}

/// Heuristic connector check: a qualified type outside the known utility
/// namespaces that is neither structural nor a configuration tag.
fn is_connector_type(t: &str) -> bool {
    match t.split_once(':') {
        Some((ns, _)) => {
            !NON_CONNECTOR_NAMESPACES.contains(&ns) && !is_structural(t) && !is_config_type(t)
        }
        None => false,
    }
}

fn is_integration_component(comp: &Component) -> bool {
    comp.config_ref.is_some()
        || is_trigger(&comp.component_type)
        || is_connector_type(&comp.component_type)
}

/// Reachability check for the integration-only mode. The visited set
/// guards flow-ref cycles and is fresh per top-level check; within one
/// check it is shared across the whole subtree.
fn has_integration_content(
    comp: &Component,
    flows: &FlowIndex,
    visited: &mut AHashSet<String>,
) -> bool {
    if is_integration_component(comp) {
        return true;
    }
    if is_flow_ref(&comp.component_type)
        && let Some(target) = comp.attribute("name")
        && visited.insert(target.to_string())
        && let Some(flow) = flows.get(target)
        && flow
            .roots
            .iter()
            .any(|root| has_integration_content(root, flows, visited))
    {
        return true;
    }
    comp.children
        .iter()
        .any(|child| has_integration_content(child, flows, visited))
}

/// Partition labels show the capitalized local name ("Async", "Try").
fn wrapper_label(comp: &Component) -> String {
    let local = comp.local_name();
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Leaf labels use the qualified or local type name; long labels get an
/// embedded line break so activity boxes stay narrow.
fn leaf_label(comp: &Component, options: RenderOptions) -> String {
    let mut name = if options.full_names {
        comp.component_type.clone()
    } else {
        comp.local_name().to_string()
    };
    if name.len() > 20 && name.is_char_boundary(20) {
        name = format!("{}\\n{}", &name[..20], &name[20..]);
    }
    name
}

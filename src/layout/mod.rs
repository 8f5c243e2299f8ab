use crate::ast::AstNode;

/// Horizontal/vertical spacing and node size for the draw pass. The exact
/// pixel values are a matter of taste; what a rasterizer actually needs is
/// the lattice coordinates each node is assigned.
#[derive(Debug, Clone, Copy)]
pub struct DrawMetrics {
    pub hstep: i64,
    pub vstep: i64,
    pub pad: i64,
    pub width: i64,
    pub height: i64,
}

impl Default for DrawMetrics {
    fn default() -> Self {
        Self {
            hstep: 60,
            vstep: 80,
            pad: 10,
            width: 50,
            height: 30,
        }
    }
}

/// An integer lattice coordinate assigned by the layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub offset: i64,
    pub depth: i64,
}

/// One AST node flattened into the arena, indices replacing references so
/// the layout pass can mutate already-placed positions by index rather than
/// through parent pointers.
struct ArenaNode {
    label: String,
    depth: usize,
    children: Vec<usize>,
}

/// The flattened AST plus the positions the layout pass assigned it.
/// `insertion_order` is the post-order sequence positions were placed in,
/// which the draw pass replays.
pub struct Layout {
    nodes: Vec<ArenaNode>,
    positions: Vec<Position>,
    insertion_order: Vec<usize>,
    n_count: Vec<usize>,
}

impl Layout {
    /// Run the full count + offset pipeline over `root`.
    pub fn build(root: &AstNode) -> Self {
        let mut nodes = Vec::new();
        let root_index = build_arena(root, 0, &mut nodes);

        let max_depth = nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        let mut n_count = vec![0usize; max_depth + 1];
        for node in &nodes {
            n_count[node.depth] += 1;
        }

        let mut positions = vec![Position { offset: 0, depth: 0 }; nodes.len()];
        let mut next_available = vec![0i64; max_depth + 1];
        let mut insertion_order = Vec::with_capacity(nodes.len());
        assign_offsets(
            root_index,
            &nodes,
            &mut positions,
            &mut next_available,
            &mut insertion_order,
        );

        Self {
            nodes,
            positions,
            insertion_order,
            n_count,
        }
    }

    /// Per-depth node counts from the count pass (index = depth).
    pub fn counts(&self) -> &[usize] {
        &self.n_count
    }

    pub fn position_of(&self, node_index: usize) -> Position {
        self.positions[node_index]
    }

    /// Emit geometry for every node (in insertion/post-order) and an edge
    /// record for every parent-child pair.
    pub fn draw(&self, metrics: DrawMetrics, rasterizer: &mut dyn Rasterizer) {
        for &index in &self.insertion_order {
            let node = &self.nodes[index];
            let position = self.positions[index];
            let record = GeometryRecord {
                label: node.label.clone(),
                x: position.offset * metrics.hstep + metrics.pad,
                y: position.depth * metrics.vstep + metrics.pad,
                width: metrics.width,
                height: metrics.height,
            };
            for &child_index in &node.children {
                let child_position = self.positions[child_index];
                let edge = EdgeRecord {
                    from: (record.x + record.width / 2, record.y + record.height),
                    to: (
                        child_position.offset * metrics.hstep + metrics.pad + metrics.width / 2,
                        child_position.depth * metrics.vstep + metrics.pad,
                    ),
                };
                rasterizer.edge(&edge);
            }
            rasterizer.node(&record);
        }
    }
}

fn build_arena(node: &AstNode, depth: usize, nodes: &mut Vec<ArenaNode>) -> usize {
    let children: Vec<usize> = node
        .children
        .iter()
        .map(|child| build_arena(child, depth + 1, nodes))
        .collect();
    nodes.push(ArenaNode {
        label: node.label(),
        depth,
        children,
    });
    nodes.len() - 1
}

/// Post-order offset assignment with collision-shift propagation.
fn assign_offsets(
    index: usize,
    nodes: &[ArenaNode],
    positions: &mut [Position],
    next_available: &mut [i64],
    insertion_order: &mut Vec<usize>,
) {
    let children = nodes[index].children.clone();
    for &child in &children {
        assign_offsets(child, nodes, positions, next_available, insertion_order);
    }

    let depth = nodes[index].depth;
    if children.is_empty() {
        let offset = next_available[depth];
        positions[index] = Position {
            offset,
            depth: depth as i64,
        };
        next_available[depth] += 2;
    } else {
        let first = *children.first().expect("non-empty");
        let last = *children.last().expect("non-empty");
        let desired = (positions[first].offset + positions[last].offset) / 2;
        positions[index] = Position {
            offset: desired,
            depth: depth as i64,
        };
        if desired >= next_available[depth] {
            next_available[depth] = desired + 2;
        } else {
            let shift = next_available[depth] - desired;
            shift_subtree(index, shift, nodes, positions, next_available);
        }
    }
    insertion_order.push(index);
}

/// Add `shift` to `index` and every descendant's offset, widening
/// `next_available` at every depth touched.
fn shift_subtree(
    index: usize,
    shift: i64,
    nodes: &[ArenaNode],
    positions: &mut [Position],
    next_available: &mut [i64],
) {
    positions[index].offset += shift;
    let depth = nodes[index].depth;
    next_available[depth] = next_available[depth].max(positions[index].offset + 2);
    for &child in &nodes[index].children {
        shift_subtree(child, shift, nodes, positions, next_available);
    }
}

/// One node's drawable geometry: top-left corner plus size.
#[derive(Debug, Clone)]
pub struct GeometryRecord {
    pub label: String,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// A single parent-to-child connector, bottom-center of the parent to
/// top-center of the child.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRecord {
    pub from: (i64, i64),
    pub to: (i64, i64),
}

/// Paints nodes and edges onto a pixel buffer and encodes it. A real
/// implementation lives outside this crate; `NullRasterizer` exists only so
/// the pipeline can be exercised without one.
pub trait Rasterizer {
    fn node(&mut self, record: &GeometryRecord);
    fn edge(&mut self, edge: &EdgeRecord);
}

#[derive(Default)]
pub struct NullRasterizer;

impl Rasterizer for NullRasterizer {
    fn node(&mut self, _record: &GeometryRecord) {}
    fn edge(&mut self, _edge: &EdgeRecord) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::source::Source;
    use crate::symbol::SymbolTable;

    fn layout_of(text: &str) -> Layout {
        let source = Source::from_text(text);
        let mut symbols = SymbolTable::new();
        let tokens = Lexer::new(&source, &mut symbols).tokenize_all().unwrap();
        let program = Parser::new(tokens).parse_program().unwrap();
        Layout::build(&program)
    }

    #[test]
    fn empty_program_places_program_and_block() {
        let layout = layout_of("program { }");
        // root is index nodes.len()-1 by construction order, but we only
        // have Program and Block here: Block (leaf, index 0) then Program.
        assert_eq!(layout.position_of(0), Position { offset: 0, depth: 1 });
        assert_eq!(layout.position_of(1), Position { offset: 0, depth: 0 });
    }

    #[test]
    fn depths_match_path_length_from_root() {
        let layout = layout_of("program { int x x = 3 }");
        // Program(0) -> Block(1) -> {Decl(2) -> {IntType(3), Id(3)}, Assign(2) -> {Id(3), Int(3)}}
        assert_eq!(layout.counts()[0], 1);
        assert_eq!(layout.counts()[1], 1);
        assert_eq!(layout.counts()[2], 2);
        assert_eq!(layout.counts()[3], 4);
    }

    #[test]
    fn same_depth_offsets_differ_by_at_least_two() {
        let layout = layout_of("program { int x x = 3 }");
        let depth3: Vec<i64> = (0..layout.counts().iter().sum::<usize>())
            .filter(|&i| layout.position_of(i).depth == 3)
            .map(|i| layout.position_of(i).offset)
            .collect();
        let mut sorted = depth3.clone();
        sorted.sort_unstable();
        for pair in sorted.windows(2) {
            assert!(pair[1] - pair[0] >= 2);
        }
        assert_eq!(sorted, vec![0, 2, 4, 6]);
    }

    #[test]
    fn deep_linear_spine_keeps_parent_offset_equal_to_child() {
        let mut source = String::from("program { ");
        for _ in 0..32 {
            source.push_str("{ ");
        }
        for _ in 0..32 {
            source.push_str("} ");
        }
        source.push('}');
        let layout = layout_of(&source);
        let total: usize = layout.counts().iter().sum();
        for i in 0..total {
            // Every node here has at most one child and thus sits at the
            // same offset as that child; the deepest leaf (empty Block) is
            // its own base case at offset 0.
            assert_eq!(layout.position_of(i).offset, 0);
        }
    }

    #[test]
    fn uneven_subtrees_keep_same_depth_offsets_separated() {
        // Decl has 2 depth-3 children, Assign also has 2, so the internal
        // nodes at depth 2 are exercised across an uneven mix of
        // four-children groups; this is exactly the shape where a naive
        // midpoint could undershoot `next_available` and require a shift.
        let layout = layout_of("program { int a int b a = 1 b = 2 }");
        let total: usize = layout.counts().iter().sum();
        let depth2: Vec<i64> = (0..total)
            .filter(|&i| layout.position_of(i).depth == 2)
            .map(|i| layout.position_of(i).offset)
            .collect();
        let mut sorted = depth2.clone();
        sorted.sort_unstable();
        for pair in sorted.windows(2) {
            assert!(pair[1] - pair[0] >= 2);
        }
    }

    #[test]
    fn shift_subtree_moves_node_descendants_and_widens_next_available() {
        // A 2-level subtree (node -> child -> grandchild) placed at offset
        // 0 at every depth, then shifted by 5: every member of the subtree
        // should move by exactly 5, and next_available at each depth it
        // touches should be widened to clear the new offset.
        let nodes = vec![
            ArenaNode {
                label: "grandchild".into(),
                depth: 2,
                children: vec![],
            },
            ArenaNode {
                label: "child".into(),
                depth: 1,
                children: vec![0],
            },
            ArenaNode {
                label: "node".into(),
                depth: 0,
                children: vec![1],
            },
        ];
        let mut positions = vec![Position { offset: 0, depth: 0 }; nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            positions[i].depth = node.depth as i64;
        }
        let mut next_available = vec![0i64; 3];

        shift_subtree(2, 5, &nodes, &mut positions, &mut next_available);

        assert_eq!(positions[0].offset, 5);
        assert_eq!(positions[1].offset, 5);
        assert_eq!(positions[2].offset, 5);
        assert_eq!(next_available[0], 7);
        assert_eq!(next_available[1], 7);
        assert_eq!(next_available[2], 7);
    }

    #[test]
    fn collision_branch_shifts_colliding_node_and_its_child() {
        // `left` (depth 0) sits over one leaf child; `middle` is a bare
        // depth-0 leaf that advances next_available[0] past where `right`'s
        // own (independently-numbered) child would put it, forcing a real
        // collision on `right`.
        let nodes = vec![
            ArenaNode { label: "leaf".into(), depth: 1, children: vec![] }, // 0: left's child
            ArenaNode { label: "left".into(), depth: 0, children: vec![0] }, // 1
            ArenaNode { label: "middle".into(), depth: 0, children: vec![] }, // 2
            ArenaNode { label: "leaf".into(), depth: 1, children: vec![] }, // 3: right's child
            ArenaNode { label: "right".into(), depth: 0, children: vec![3] }, // 4
        ];
        let mut positions = vec![Position { offset: 0, depth: 0 }; nodes.len()];
        let mut next_available = vec![0i64; 2];
        let mut insertion_order = Vec::new();

        assign_offsets(1, &nodes, &mut positions, &mut next_available, &mut insertion_order);
        assign_offsets(2, &nodes, &mut positions, &mut next_available, &mut insertion_order);
        assign_offsets(4, &nodes, &mut positions, &mut next_available, &mut insertion_order);

        assert_eq!(positions[1].offset, 0); // left over its only child
        assert_eq!(positions[2].offset, 2); // middle, a bare depth-0 leaf
                                             // right's child is numbered independently at depth 1 (offset 2),
                                             // so right's desired offset (2) collides with next_available[0]
                                             // (4, after `middle`) and must shift by 2.
        assert_eq!(positions[3].offset, 4); // right's child carried along by the shift
        assert_eq!(positions[4].offset, 4);
        assert!(positions[4].offset - positions[2].offset >= 2);
    }
}

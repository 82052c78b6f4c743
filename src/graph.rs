use crate::document::{Cell, PathPoint};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashSet;

/// Граф смежности ячеек: узел `i` соответствует ячейке `i`
pub fn build_cell_graph(cells: &[Cell]) -> UnGraph<usize, ()> {
    let mut graph = UnGraph::with_capacity(cells.len(), cells.len() * 3);
    for index in 0..cells.len() {
        graph.add_node(index);
    }

    let mut edges = HashSet::new();
    for (index, cell) in cells.iter().enumerate() {
        for &n in &cell.neighbors {
            if n == index {
                continue;
            }
            let (a, b) = if index < n { (index, n) } else { (n, index) };
            if edges.insert((a, b)) {
                graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
            }
        }
    }
    graph
}

/// Индексы точек пути, перед которыми путь перескакивает через несмежные ячейки
///
/// Учитываются только пары соседних точек, у которых известны обе ячейки.
pub fn find_discontinuities(points: &[PathPoint], graph: &UnGraph<usize, ()>) -> Vec<usize> {
    points
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| match (pair[0].cell, pair[1].cell) {
            (Some(a), Some(b))
                if a != b && !graph.contains_edge(NodeIndex::new(a), NodeIndex::new(b)) =>
            {
                Some(i + 1)
            }
            _ => None,
        })
        .collect()
}

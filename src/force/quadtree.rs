//! Barnes-Hut quadtree over node positions
//!
//! Each cell aggregates the count and position sum of the bodies below it so
//! a distant cell can stand in for all of them.

/// Cells smaller than this stop subdividing and hold several bodies
const MIN_CELL_SIZE: f64 = 1e-6;

#[derive(Debug)]
struct Cell {
    x0: f64,
    y0: f64,
    size: f64,
    count: usize,
    sum_x: f64,
    sum_y: f64,
    children: Option<[usize; 4]>,
    bodies: Vec<usize>,
}

impl Cell {
    fn new(x0: f64, y0: f64, size: f64) -> Self {
        Self {
            x0,
            y0,
            size,
            count: 0,
            sum_x: 0.0,
            sum_y: 0.0,
            children: None,
            bodies: Vec::new(),
        }
    }

    fn quadrant(&self, x: f64, y: f64) -> usize {
        let half = self.size / 2.0;
        let right = x >= self.x0 + half;
        let bottom = y >= self.y0 + half;
        usize::from(right) | (usize::from(bottom) << 1)
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        (self.x0..=self.x0 + self.size).contains(&x)
            && (self.y0..=self.y0 + self.size).contains(&y)
    }
}

/// A source of force seen from one body: a single body or an aggregate cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Source {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

pub(crate) struct QuadTree {
    cells: Vec<Cell>,
    points: Vec<(f64, f64)>,
}

impl QuadTree {
    pub fn build(points: Vec<(f64, f64)>) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(x, y) in &points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if points.is_empty() {
            (min_x, min_y, max_x, max_y) = (0.0, 0.0, 0.0, 0.0);
        }
        let size = (max_x - min_x).max(max_y - min_y).max(1.0);

        let mut tree = Self {
            cells: vec![Cell::new(min_x, min_y, size)],
            points,
        };
        for body in 0..tree.points.len() {
            tree.insert(body);
        }
        tree
    }

    fn insert(&mut self, body: usize) {
        let (x, y) = self.points[body];
        let mut current = 0;

        loop {
            let cell = &mut self.cells[current];
            cell.count += 1;
            cell.sum_x += x;
            cell.sum_y += y;

            if let Some(children) = cell.children {
                current = children[cell.quadrant(x, y)];
                continue;
            }
            if cell.bodies.is_empty() || cell.size <= MIN_CELL_SIZE {
                cell.bodies.push(body);
                return;
            }

            // Occupied leaf: split and push the resident body down one level
            let resident = std::mem::take(&mut cell.bodies);
            let (x0, y0, half) = (cell.x0, cell.y0, cell.size / 2.0);
            let first = self.cells.len();
            let children = [first, first + 1, first + 2, first + 3];
            self.cells.extend([
                Cell::new(x0, y0, half),
                Cell::new(x0 + half, y0, half),
                Cell::new(x0, y0 + half, half),
                Cell::new(x0 + half, y0 + half, half),
            ]);
            self.cells[current].children = Some(children);

            for other in resident {
                let (ox, oy) = self.points[other];
                let slot = self.cells[current].quadrant(ox, oy);
                let child = &mut self.cells[children[slot]];
                child.count += 1;
                child.sum_x += ox;
                child.sum_y += oy;
                child.bodies.push(other);
            }

            current = children[self.cells[current].quadrant(x, y)];
        }
    }

    /// Visit every force source acting on `body`
    ///
    /// A cell whose `size / distance` falls below `theta` is reported as one
    /// aggregate source at its center of mass. Cells containing `body` are
    /// always opened so a body never acts on itself.
    pub fn visit(&self, body: usize, theta: f64, mut f: impl FnMut(Source)) {
        let (x, y) = self.points[body];
        let theta2 = theta * theta;
        let mut stack = vec![0];

        while let Some(index) = stack.pop() {
            let cell = &self.cells[index];
            if cell.count == 0 {
                continue;
            }

            match cell.children {
                Some(children) => {
                    let count = cell.count as f64;
                    let (cx, cy) = (cell.sum_x / count, cell.sum_y / count);
                    let d2 = (cx - x).powi(2) + (cy - y).powi(2);
                    if !cell.contains(x, y) && cell.size * cell.size < theta2 * d2 {
                        f(Source {
                            x: cx,
                            y: cy,
                            weight: count,
                        });
                    } else {
                        stack.extend(children);
                    }
                }
                None => {
                    for &other in cell.bodies.iter().filter(|&&b| b != body) {
                        let (ox, oy) = self.points[other];
                        f(Source {
                            x: ox,
                            y: oy,
                            weight: 1.0,
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_weight(tree: &QuadTree, body: usize, theta: f64) -> f64 {
        let mut total = 0.0;
        tree.visit(body, theta, |s| total += s.weight);
        total
    }

    #[test]
    fn every_other_body_is_accounted_for() {
        let points: Vec<_> = (0..50)
            .map(|i| ((i * 37 % 101) as f64, (i * 53 % 89) as f64))
            .collect();
        let tree = QuadTree::build(points);

        for body in [0, 17, 49] {
            assert_eq!(total_weight(&tree, body, 0.0), 49.0);
            assert_eq!(total_weight(&tree, body, 0.9), 49.0);
        }
    }

    #[test]
    fn exact_mode_visits_individual_bodies() {
        let tree = QuadTree::build(vec![(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        let mut sources = Vec::new();
        tree.visit(0, 0.0, |s| sources.push(s));

        assert_eq!(sources.len(), 2);
        assert!(sources.iter().all(|s| s.weight == 1.0));
    }

    #[test]
    fn distant_cluster_collapses_into_one_source() {
        let mut points = vec![(0.0, 0.0)];
        points.extend((0..8).map(|i| (1000.0 + i as f64, 1000.0 + (i % 3) as f64)));
        let tree = QuadTree::build(points);

        let mut sources = Vec::new();
        tree.visit(0, 0.9, |s| sources.push(s));

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].weight, 8.0);
    }

    #[test]
    fn coincident_bodies_share_a_leaf() {
        let tree = QuadTree::build(vec![(5.0, 5.0), (5.0, 5.0), (5.0, 5.0), (9.0, 1.0)]);
        assert_eq!(total_weight(&tree, 0, 0.0), 3.0);
    }
}

//! Default algorithm sources
//!
//! Every template defines one of the harness entry routines. The bubble and
//! selection templates exchange elements with destructuring assignment, so the
//! harness reports their exchanges as `swap` events; merge and quick sort move
//! values through temporaries and produce `overwrite` events.

use crate::harness::{Family, Input};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    /// Short name used on the command line
    pub name: &'static str,
    pub title: &'static str,
    pub family: Family,
    pub source: &'static str,
}

pub const BUBBLE_SORT: &str = r#"function bubbleSort(arr) {
  const n = arr.length;
  for (let i = 0; i < n; i++) {
    for (let j = 0; j < n - i - 1; j++) {
      if (arr[j] > arr[j + 1]) {
        [arr[j], arr[j + 1]] = [arr[j + 1], arr[j]];
      }
    }
  }
  return arr;
}
"#;

pub const SELECTION_SORT: &str = r#"function selectionSort(arr) {
  const n = arr.length;
  for (let i = 0; i < n; i++) {
    let minIdx = i;
    for (let j = i + 1; j < n; j++) {
      if (arr[minIdx] > arr[j]) {
        minIdx = j;
      }
    }
    if (minIdx !== i) {
      [arr[i], arr[minIdx]] = [arr[minIdx], arr[i]];
    }
  }
  return arr;
}
"#;

pub const INSERTION_SORT: &str = r#"function insertionSort(arr) {
  for (let i = 1; i < arr.length; i++) {
    const key = arr[i];
    let j = i - 1;
    while (j >= 0 && arr[j] > key) {
      arr[j + 1] = arr[j];
      j--;
    }
    arr[j + 1] = key;
  }
  return arr;
}
"#;

pub const MERGE_SORT: &str = r#"function mergeSort(arr, l = 0, r = arr.length - 1) {
  if (l >= r) return;

  const m = Math.floor(l + (r - l) / 2);

  mergeSort(arr, l, m);
  mergeSort(arr, m + 1, r);

  merge(arr, l, m, r);
}

function merge(arr, l, m, r) {
  const n1 = m - l + 1;
  const n2 = r - m;

  // Copies are plain arrays; only writes back into arr are traced
  const L = [];
  const R = [];

  for (let i = 0; i < n1; i++) L[i] = arr[l + i];
  for (let j = 0; j < n2; j++) R[j] = arr[m + 1 + j];

  let i = 0, j = 0, k = l;

  while (i < n1 && j < n2) {
    if (L[i] <= R[j]) {
      arr[k] = L[i];
      i++;
    } else {
      arr[k] = R[j];
      j++;
    }
    k++;
  }

  while (i < n1) {
    arr[k] = L[i];
    i++;
    k++;
  }

  while (j < n2) {
    arr[k] = R[j];
    j++;
    k++;
  }
}
"#;

pub const QUICK_SORT: &str = r#"function quickSort(arr, low = 0, high = arr.length - 1) {
  if (low < high) {
    const pi = partition(arr, low, high);

    quickSort(arr, low, pi - 1);
    quickSort(arr, pi + 1, high);
  }
}

function partition(arr, low, high) {
  const pivot = arr[high];
  let i = low - 1;

  for (let j = low; j <= high - 1; j++) {
    if (arr[j] < pivot) {
      i++;
      const temp = arr[i];
      arr[i] = arr[j];
      arr[j] = temp;
    }
  }
  const temp = arr[i + 1];
  arr[i + 1] = arr[high];
  arr[high] = temp;

  return i + 1;
}
"#;

pub const BFS: &str = r#"function bfs(graph, visited, start = 0) {
  const queue = [start];
  visited[start] = 1;
  for (const node of queue) {
    for (const next of graph[node]) {
      if (visited[next] === 0) {
        visited[next] = 1;
        queue.push(next);
      }
    }
  }
}
"#;

pub const DFS: &str = r#"function dfs(graph, visited, node = 0) {
  visited[node] = 1;
  for (const next of graph[node]) {
    if (visited[next] === 0) {
      dfs(graph, visited, next);
    }
  }
}
"#;

pub const TEMPLATES: [Template; 7] = [
    Template {
        name: "bubble",
        title: "Bubble Sort",
        family: Family::Sorting,
        source: BUBBLE_SORT,
    },
    Template {
        name: "selection",
        title: "Selection Sort",
        family: Family::Sorting,
        source: SELECTION_SORT,
    },
    Template {
        name: "insertion",
        title: "Insertion Sort",
        family: Family::Sorting,
        source: INSERTION_SORT,
    },
    Template {
        name: "merge",
        title: "Merge Sort",
        family: Family::Sorting,
        source: MERGE_SORT,
    },
    Template {
        name: "quick",
        title: "Quick Sort",
        family: Family::Sorting,
        source: QUICK_SORT,
    },
    Template {
        name: "bfs",
        title: "Breadth-First Search",
        family: Family::Graph,
        source: BFS,
    },
    Template {
        name: "dfs",
        title: "Depth-First Search",
        family: Family::Graph,
        source: DFS,
    },
];

pub fn by_name(name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|template| template.name == name)
}

/// Array used when no numbers are given
pub fn demo_array() -> Vec<f64> {
    vec![38.0, 27.0, 43.0, 3.0, 9.0, 82.0, 10.0, 55.0, 21.0, 67.0]
}

/// 4-node cycle `0-1-2-3-0`
pub fn demo_graph() -> Vec<Vec<usize>> {
    vec![vec![1, 3], vec![0, 2], vec![1, 3], vec![0, 2]]
}

/// Harness inputs for a graph routine: the adjacency list and a zeroed
/// visited array
pub fn graph_inputs(adjacency: &[Vec<usize>]) -> Vec<Input> {
    vec![
        Input::adjacency(adjacency),
        Input::numbers(&vec![0.0; adjacency.len()]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{execute, ENTRY_ROUTINES};
    use crate::parser::parse_program;

    #[test]
    fn test_templates_parse_and_define_entry_routines() {
        for template in &TEMPLATES {
            parse_program(template.source).unwrap();
            assert!(
                ENTRY_ROUTINES
                    .iter()
                    .any(|routine| template.source.starts_with(&format!("function {}(", routine.name))),
                "{} does not start with an entry routine",
                template.name
            );
        }
    }

    #[test]
    fn test_sorting_templates_sort() {
        let input = demo_array();
        let mut expected = input.clone();
        expected.sort_by(|a, b| a.total_cmp(b));

        for template in TEMPLATES.iter().filter(|t| t.family == Family::Sorting) {
            let trace = execute(template.source, &[Input::numbers(&input)]).unwrap();
            assert_eq!(trace.replay(&input), expected, "{}", template.name);
        }
    }

    #[test]
    fn test_graph_templates_visit_every_node() {
        for name in ["bfs", "dfs"] {
            let template = by_name(name).unwrap();
            let trace = execute(template.source, &graph_inputs(&demo_graph())).unwrap();
            assert_eq!(trace.replay(&[0.0; 4]), vec![1.0; 4], "{}", name);
        }
    }
}

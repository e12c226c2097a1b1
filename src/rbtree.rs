//! Arena-backed red-black tree threaded with an in-order doubly-linked list.
//!
//! The sweepline needs the same ordered structure twice: once for the
//! beachline, whose sort key (the breakpoint position) moves with the sweep
//! and is recomputed at every comparison, and once for the circle-event
//! queue. Because keys are implicit, the tree does not compare items itself;
//! callers locate the insertion point and call [RedBlackTree::insert_successor].
//!
//! Every node carries `prev`/`next` links kept in sync with tree order, so
//! neighbor lookup is O(1) without re-traversal. Nodes live in a `Vec` and
//! reference each other by index; removed slots go on a free list and are
//! reused by later insertions, which keeps allocation churn flat across
//! repeated computations.

/// Sentinel index for "no node".
pub(crate) const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<T> {
    item: T,
    parent: usize,
    left: usize,
    right: usize,
    prev: usize,
    next: usize,
    red: bool,
}

#[derive(Debug)]
pub(crate) struct RedBlackTree<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    root: usize,
}

impl<T> Default for RedBlackTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RedBlackTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NIL,
        }
    }

    /// Drops all nodes but keeps the allocated capacity for the next use.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = NIL;
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.root == NIL
    }

    /// Allocates a slot for `item`, reusing a freed slot when one exists.
    /// The returned index is stable until [Self::release] or [Self::clear].
    pub fn alloc(&mut self, item: T) -> usize {
        let node = Node {
            item,
            parent: NIL,
            left: NIL,
            right: NIL,
            prev: NIL,
            next: NIL,
            red: false,
        };
        if let Some(slot) = self.free.pop() {
            self.nodes[slot] = node;
            slot
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    /// Returns a removed node's slot to the free list.
    pub fn release(&mut self, node: usize) {
        self.free.push(node);
    }

    #[inline]
    pub fn item(&self, node: usize) -> &T {
        &self.nodes[node].item
    }

    #[inline]
    pub fn item_mut(&mut self, node: usize) -> &mut T {
        &mut self.nodes[node].item
    }

    #[inline]
    pub fn prev(&self, node: usize) -> usize {
        self.nodes[node].prev
    }

    #[inline]
    pub fn next(&self, node: usize) -> usize {
        self.nodes[node].next
    }

    #[inline]
    pub fn root(&self) -> usize {
        self.root
    }

    #[inline]
    pub fn left(&self, node: usize) -> usize {
        self.nodes[node].left
    }

    #[inline]
    pub fn right(&self, node: usize) -> usize {
        self.nodes[node].right
    }

    /// Leftmost node of the whole tree, or `NIL` when empty.
    #[cfg(test)]
    pub fn first(&self) -> usize {
        if self.root == NIL {
            NIL
        } else {
            self.first_from(self.root)
        }
    }

    /// Rightmost node of the whole tree, or `NIL` when empty.
    #[cfg(test)]
    pub fn last(&self) -> usize {
        if self.root == NIL {
            NIL
        } else {
            self.last_from(self.root)
        }
    }

    fn first_from(&self, mut node: usize) -> usize {
        while self.nodes[node].left != NIL {
            node = self.nodes[node].left;
        }
        node
    }

    #[cfg(test)]
    fn last_from(&self, mut node: usize) -> usize {
        while self.nodes[node].right != NIL {
            node = self.nodes[node].right;
        }
        node
    }

    /// Inserts `successor` immediately after `node` in tree order, or as the
    /// first node when `node` is `NIL`.
    pub fn insert_successor(&mut self, node: usize, successor: usize) {
        let mut parent;
        if node != NIL {
            // thread the in-order list
            self.nodes[successor].prev = node;
            let node_next = self.nodes[node].next;
            self.nodes[successor].next = node_next;
            if node_next != NIL {
                self.nodes[node_next].prev = successor;
            }
            self.nodes[node].next = successor;
            // hook into the tree: either as the leftmost descendant of the
            // right subtree, or directly as the right child
            if self.nodes[node].right != NIL {
                let leftmost = self.first_from(self.nodes[node].right);
                self.nodes[leftmost].left = successor;
                parent = leftmost;
            } else {
                self.nodes[node].right = successor;
                parent = node;
            }
        } else if self.root != NIL {
            let first = self.first_from(self.root);
            self.nodes[successor].prev = NIL;
            self.nodes[successor].next = first;
            self.nodes[first].prev = successor;
            self.nodes[first].left = successor;
            parent = first;
        } else {
            self.nodes[successor].prev = NIL;
            self.nodes[successor].next = NIL;
            self.root = successor;
            parent = NIL;
        }
        self.nodes[successor].left = NIL;
        self.nodes[successor].right = NIL;
        self.nodes[successor].parent = parent;
        self.nodes[successor].red = true;

        // rebalance
        let mut node = successor;
        while parent != NIL && self.nodes[parent].red {
            let grandpa = self.nodes[parent].parent;
            if parent == self.nodes[grandpa].left {
                let uncle = self.nodes[grandpa].right;
                if uncle != NIL && self.nodes[uncle].red {
                    self.nodes[parent].red = false;
                    self.nodes[uncle].red = false;
                    self.nodes[grandpa].red = true;
                    node = grandpa;
                } else {
                    if node == self.nodes[parent].right {
                        self.rotate_left(parent);
                        node = parent;
                        parent = self.nodes[node].parent;
                    }
                    self.nodes[parent].red = false;
                    self.nodes[grandpa].red = true;
                    self.rotate_right(grandpa);
                }
            } else {
                let uncle = self.nodes[grandpa].left;
                if uncle != NIL && self.nodes[uncle].red {
                    self.nodes[parent].red = false;
                    self.nodes[uncle].red = false;
                    self.nodes[grandpa].red = true;
                    node = grandpa;
                } else {
                    if node == self.nodes[parent].left {
                        self.rotate_right(parent);
                        node = parent;
                        parent = self.nodes[node].parent;
                    }
                    self.nodes[parent].red = false;
                    self.nodes[grandpa].red = true;
                    self.rotate_left(grandpa);
                }
            }
            parent = self.nodes[node].parent;
        }
        self.nodes[self.root].red = false;
    }

    /// Removes `node` from the tree and the in-order list.
    ///
    /// The slot is not freed; call [Self::release] once the caller is done
    /// reading the removed item.
    pub fn remove(&mut self, node: usize) {
        // unthread the in-order list
        let node_next = self.nodes[node].next;
        let node_prev = self.nodes[node].prev;
        if node_next != NIL {
            self.nodes[node_next].prev = node_prev;
        }
        if node_prev != NIL {
            self.nodes[node_prev].next = node_next;
        }
        self.nodes[node].next = NIL;
        self.nodes[node].prev = NIL;

        let mut parent = self.nodes[node].parent;
        let left = self.nodes[node].left;
        let right = self.nodes[node].right;
        let next = if left == NIL {
            right
        } else if right == NIL {
            left
        } else {
            self.first_from(right)
        };
        if parent != NIL {
            if self.nodes[parent].left == node {
                self.nodes[parent].left = next;
            } else {
                self.nodes[parent].right = next;
            }
        } else {
            self.root = next;
        }

        // `next` takes the removed node's place; `fix` is the node (possibly
        // NIL) that may violate the black-height invariant afterwards
        let is_red;
        let mut fix;
        if left != NIL && right != NIL {
            is_red = self.nodes[next].red;
            self.nodes[next].red = self.nodes[node].red;
            self.nodes[next].left = left;
            self.nodes[left].parent = next;
            if next != right {
                parent = self.nodes[next].parent;
                self.nodes[next].parent = self.nodes[node].parent;
                fix = self.nodes[next].right;
                self.nodes[parent].left = fix;
                self.nodes[next].right = right;
                self.nodes[right].parent = next;
            } else {
                self.nodes[next].parent = parent;
                parent = next;
                fix = self.nodes[next].right;
            }
        } else {
            is_red = self.nodes[node].red;
            fix = next;
        }
        if fix != NIL {
            self.nodes[fix].parent = parent;
        }
        if is_red {
            return;
        }
        if fix != NIL && self.nodes[fix].red {
            self.nodes[fix].red = false;
            return;
        }

        // deletion rebalance; `fix` may be NIL, in which case comparisons
        // against a NIL child slot behave like the null checks they mirror
        let mut node = fix;
        loop {
            if node == self.root {
                break;
            }
            if node == self.nodes[parent].left {
                let mut sibling = self.nodes[parent].right;
                if self.nodes[sibling].red {
                    self.nodes[sibling].red = false;
                    self.nodes[parent].red = true;
                    self.rotate_left(parent);
                    sibling = self.nodes[parent].right;
                }
                let s_left = self.nodes[sibling].left;
                let s_right = self.nodes[sibling].right;
                if (s_left != NIL && self.nodes[s_left].red)
                    || (s_right != NIL && self.nodes[s_right].red)
                {
                    if s_right == NIL || !self.nodes[s_right].red {
                        self.nodes[s_left].red = false;
                        self.nodes[sibling].red = true;
                        self.rotate_right(sibling);
                        sibling = self.nodes[parent].right;
                    }
                    self.nodes[sibling].red = self.nodes[parent].red;
                    self.nodes[parent].red = false;
                    let s_right = self.nodes[sibling].right;
                    self.nodes[s_right].red = false;
                    self.rotate_left(parent);
                    node = self.root;
                    break;
                }
                self.nodes[sibling].red = true;
            } else {
                let mut sibling = self.nodes[parent].left;
                if self.nodes[sibling].red {
                    self.nodes[sibling].red = false;
                    self.nodes[parent].red = true;
                    self.rotate_right(parent);
                    sibling = self.nodes[parent].left;
                }
                let s_left = self.nodes[sibling].left;
                let s_right = self.nodes[sibling].right;
                if (s_left != NIL && self.nodes[s_left].red)
                    || (s_right != NIL && self.nodes[s_right].red)
                {
                    if s_left == NIL || !self.nodes[s_left].red {
                        self.nodes[s_right].red = false;
                        self.nodes[sibling].red = true;
                        self.rotate_left(sibling);
                        sibling = self.nodes[parent].left;
                    }
                    self.nodes[sibling].red = self.nodes[parent].red;
                    self.nodes[parent].red = false;
                    let s_left = self.nodes[sibling].left;
                    self.nodes[s_left].red = false;
                    self.rotate_right(parent);
                    node = self.root;
                    break;
                }
                self.nodes[sibling].red = true;
            }
            node = parent;
            parent = self.nodes[parent].parent;
            if self.nodes[node].red {
                break;
            }
        }
        if node != NIL {
            self.nodes[node].red = false;
        }
    }

    fn rotate_left(&mut self, node: usize) {
        let p = node;
        let q = self.nodes[node].right;
        let parent = self.nodes[p].parent;
        if parent != NIL {
            if self.nodes[parent].left == p {
                self.nodes[parent].left = q;
            } else {
                self.nodes[parent].right = q;
            }
        } else {
            self.root = q;
        }
        self.nodes[q].parent = parent;
        self.nodes[p].parent = q;
        self.nodes[p].right = self.nodes[q].left;
        if self.nodes[p].right != NIL {
            let r = self.nodes[p].right;
            self.nodes[r].parent = p;
        }
        self.nodes[q].left = p;
    }

    fn rotate_right(&mut self, node: usize) {
        let p = node;
        let q = self.nodes[node].left;
        let parent = self.nodes[p].parent;
        if parent != NIL {
            if self.nodes[parent].left == p {
                self.nodes[parent].left = q;
            } else {
                self.nodes[parent].right = q;
            }
        } else {
            self.root = q;
        }
        self.nodes[q].parent = parent;
        self.nodes[p].parent = q;
        self.nodes[p].left = self.nodes[q].right;
        if self.nodes[p].left != NIL {
            let l = self.nodes[p].left;
            self.nodes[l].parent = p;
        }
        self.nodes[q].right = p;
    }
}

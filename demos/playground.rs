use avltree::AvlTree;

fn main() {
    let mut tree = AvlTree::new();
    for (key, payload) in [(5, "five"), (4, "four"), (3, "three"), (2, "two"), (1, "one")] {
        tree.insert(key, payload);
        println!("{tree}");
    }
    println!("{tree:?}");

    assert_eq!(tree.search(&2), Some(&"two"));

    for key in [5, 2, 1, 4, 3] {
        tree.delete(&key);
        println!("{tree}");
    }
    assert!(tree.is_empty());
}

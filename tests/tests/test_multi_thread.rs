// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use jsonic_core::config::Config;
use jsonic_core::extension::Extension;
use jsonic_core::registry::Registry;
use jsonic_derive::Reflect;

#[derive(Reflect, Debug, Default, PartialEq, Eq, Hash, Clone)]
struct Item {
    id: u32,
    label: String,
    children: Vec<Item>,
}

fn item(id: u32) -> Item {
    Item {
        id,
        label: format!("item-{id}"),
        children: vec![Item {
            id: id * 100,
            ..Item::default()
        }],
    }
}

#[test]
fn test_simple_multi_thread() {
    let api = Config::default().freeze_in(&Registry::new());
    let src: HashSet<i32> = [41, 42, 43, 45, 46, 47].into_iter().collect();
    let handles: Vec<_> = src
        .iter()
        .map(|n| {
            let api = Arc::clone(&api);
            let n = *n;
            thread::spawn(move || api.marshal(&n).unwrap())
        })
        .collect();
    let dest: HashSet<i32> = handles
        .into_iter()
        .map(|h| api.unmarshal::<i32>(&h.join().unwrap()).unwrap())
        .collect();
    assert_eq!(dest, src);
}

#[test]
fn test_concurrent_first_use() {
    let registry = Registry::new();
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads as u32)
        .map(|id| {
            let barrier = Arc::clone(&barrier);
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                barrier.wait();
                // every thread freezes and compiles at the same moment
                let api = Config::standard().freeze_in(&registry);
                let json = api.marshal(&item(id)).unwrap();
                let back: Item = api.unmarshal(&json).unwrap();
                (Arc::as_ptr(&api) as usize, back)
            })
        })
        .collect();

    let mut instances = HashSet::new();
    let mut items = HashSet::new();
    for handle in handles {
        let (instance, back) = handle.join().unwrap();
        instances.insert(instance);
        items.insert(back);
    }
    assert_eq!(instances.len(), 1);
    assert_eq!(items, (0..threads as u32).map(item).collect::<HashSet<_>>());
    assert_eq!(registry.frozen_count(), 1);
}

#[test]
fn test_shared_encoder_across_threads() {
    let api = Config::compatible_with_standard_library().freeze_in(&Registry::new());
    let expected = api.marshal_to_string(&item(7)).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let api = Arc::clone(&api);
            thread::spawn(move || {
                (0..100)
                    .map(|_| api.marshal_to_string(&item(7)).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().iter().all(|json| *json == expected));
    }
}

struct Noop;

impl Extension for Noop {}

#[test]
fn test_concurrent_extension_registration() {
    let registry = Registry::new();
    let api = Config::default().freeze_in(&registry);
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let api = api.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                api.register_extension(Arc::new(Noop));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Only the final extension set keys the instance.
    assert_eq!(registry.frozen_count(), 1);
    let fresh = Config::default().freeze_in(&registry);
    assert!(!Arc::ptr_eq(&api, &fresh));
    assert_eq!(registry.frozen_count(), 2);
    assert_eq!(
        api.marshal_to_string(&item(1)).unwrap(),
        fresh.marshal_to_string(&item(1)).unwrap()
    );
}

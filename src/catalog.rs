use std::collections::BTreeMap;

use serde_json::json;

use crate::error::{Error, Result};
use crate::models::problem::{Difficulty, Example, Problem, TestCase};
use crate::models::test::{Test, TestKind};

/// Static catalog of coding problems and the tests that bundle them.
/// Recruiter-authored in the broader system; fixed and read-only here.
#[derive(Clone, Debug)]
pub struct Catalog {
    problems: Vec<Problem>,
    tests: Vec<Test>,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            problems: builtin_problems(),
            tests: builtin_tests(),
        }
    }

    pub fn problem(&self, id: &str) -> Result<&Problem> {
        self.problems
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("Problem not found: {}", id)))
    }

    pub fn test(&self, id: &str) -> Result<&Test> {
        self.tests
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Test not found: {}", id)))
    }

    /// The problem a candidate session works on. Only the first problem
    /// of a test is served; a test with no resolvable problem
    /// invalidates the session.
    pub fn first_problem_of(&self, test: &Test) -> Result<&Problem> {
        let first_id = test
            .problem_ids
            .first()
            .ok_or_else(|| Error::NotFound(format!("Test has no problems: {}", test.id)))?;
        self.problem(first_id)
    }

    pub fn tests_of_kind(&self, kind: TestKind) -> Vec<&Test> {
        self.tests.iter().filter(|t| t.kind == kind).collect()
    }
}

fn starter(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(lang, code)| (lang.to_string(), code.to_string()))
        .collect()
}

fn cases(raw: &[(&[serde_json::Value], serde_json::Value)]) -> Vec<TestCase> {
    raw.iter()
        .map(|(input, expected)| TestCase {
            input: input.to_vec(),
            expected: expected.clone(),
        })
        .collect()
}

fn builtin_problems() -> Vec<Problem> {
    vec![
        Problem {
            id: "two-sum".into(),
            title: "Two Sum".into(),
            prompt: "Given an array of integers `nums` and an integer `target`, return \
                     indices of the two numbers such that they add up to `target`.\n\n\
                     You may assume that each input would have **exactly one solution**, \
                     and you may not use the same element twice.\n\n\
                     You can return the answer in any order."
                .into(),
            examples: vec![
                Example {
                    input: "nums = [2,7,11,15], target = 9".into(),
                    output: "[0,1]".into(),
                    explanation: Some(
                        "Because nums[0] + nums[1] == 9, we return [0, 1].".into(),
                    ),
                },
                Example {
                    input: "nums = [3,2,4], target = 6".into(),
                    output: "[1,2]".into(),
                    explanation: None,
                },
                Example {
                    input: "nums = [3,3], target = 6".into(),
                    output: "[0,1]".into(),
                    explanation: None,
                },
            ],
            constraints: vec![
                "`2 <= nums.length <= 10^4`".into(),
                "`-10^9 <= nums[i] <= 10^9`".into(),
                "`-10^9 <= target <= 10^9`".into(),
                "**Only one valid answer exists.**".into(),
            ],
            difficulty: Difficulty::Easy,
            starter_code: starter(&[
                (
                    "javascript",
                    "/**\n * @param {number[]} nums\n * @param {number} target\n * @return {number[]}\n */\nvar twoSum = function(nums, target) {\n    \n};",
                ),
                (
                    "python",
                    "class Solution:\n    def twoSum(self, nums: List[int], target: int) -> List[int]:\n        ",
                ),
                (
                    "java",
                    "class Solution {\n    public int[] twoSum(int[] nums, int target) {\n        \n    }\n}",
                ),
                (
                    "cpp",
                    "class Solution {\npublic:\n    vector<int> twoSum(vector<int>& nums, int target) {\n        \n    }\n};",
                ),
            ]),
            test_cases: cases(&[
                (&[json!([2, 7, 11, 15]), json!(9)], json!([0, 1])),
                (&[json!([3, 2, 4]), json!(6)], json!([1, 2])),
                (&[json!([3, 3]), json!(6)], json!([0, 1])),
                (&[json!([-1, -2, -3, -4, -5]), json!(-8)], json!([2, 4])),
            ]),
        },
        Problem {
            id: "valid-parentheses".into(),
            title: "Valid Parentheses".into(),
            prompt: "Given a string s containing just the characters '(', ')', '{', '}', \
                     '[' and ']', determine if the input string is valid.\n\n\
                     An input string is valid if:\n\
                     1. Open brackets must be closed by the same type of brackets.\n\
                     2. Open brackets must be closed in the correct order.\n\
                     3. Every close bracket has a corresponding open bracket of the same type."
                .into(),
            examples: vec![
                Example {
                    input: "s = \"()\"".into(),
                    output: "true".into(),
                    explanation: None,
                },
                Example {
                    input: "s = \"()[]{}\"".into(),
                    output: "true".into(),
                    explanation: None,
                },
                Example {
                    input: "s = \"(]\"".into(),
                    output: "false".into(),
                    explanation: None,
                },
            ],
            constraints: vec![
                "`1 <= s.length <= 10^4`".into(),
                "`s` consists of parentheses only '()[]{}'.".into(),
            ],
            difficulty: Difficulty::Easy,
            starter_code: starter(&[
                (
                    "javascript",
                    "/**\n * @param {string} s\n * @return {boolean}\n */\nvar isValid = function(s) {\n    \n};",
                ),
                (
                    "python",
                    "class Solution:\n    def isValid(self, s: str) -> bool:\n        ",
                ),
                (
                    "java",
                    "class Solution {\n    public boolean isValid(String s) {\n        \n    }\n}",
                ),
                (
                    "cpp",
                    "class Solution {\npublic:\n    bool isValid(string s) {\n        \n    }\n};",
                ),
            ]),
            test_cases: cases(&[
                (&[json!("()")], json!(true)),
                (&[json!("()[]{}")], json!(true)),
                (&[json!("(]")], json!(false)),
                (&[json!("([)]")], json!(false)),
                (&[json!("{[]}")], json!(true)),
            ]),
        },
        Problem {
            id: "longest-substring".into(),
            title: "Longest Substring Without Repeating Characters".into(),
            prompt: "Given a string `s`, find the length of the **longest substring** \
                     without repeating characters."
                .into(),
            examples: vec![
                Example {
                    input: "s = \"abcabcbb\"".into(),
                    output: "3".into(),
                    explanation: Some("The answer is \"abc\", with the length of 3.".into()),
                },
                Example {
                    input: "s = \"bbbbb\"".into(),
                    output: "1".into(),
                    explanation: Some("The answer is \"b\", with the length of 1.".into()),
                },
                Example {
                    input: "s = \"pwwkew\"".into(),
                    output: "3".into(),
                    explanation: Some(
                        "The answer is \"wke\", with the length of 3. Notice that the answer \
                         must be a substring, \"pwke\" is a subsequence and not a substring."
                            .into(),
                    ),
                },
            ],
            constraints: vec![
                "`0 <= s.length <= 5 * 10^4`".into(),
                "`s` consists of English letters, digits, symbols and spaces.".into(),
            ],
            difficulty: Difficulty::Medium,
            starter_code: starter(&[
                (
                    "javascript",
                    "/**\n * @param {string} s\n * @return {number}\n */\nvar lengthOfLongestSubstring = function(s) {\n    \n};",
                ),
                (
                    "python",
                    "class Solution:\n    def lengthOfLongestSubstring(self, s: str) -> int:\n        ",
                ),
            ]),
            test_cases: cases(&[
                (&[json!("abcabcbb")], json!(3)),
                (&[json!("bbbbb")], json!(1)),
                (&[json!("pwwkew")], json!(3)),
                (&[json!("")], json!(0)),
                (&[json!(" ")], json!(1)),
                (&[json!("au")], json!(2)),
                (&[json!("dvdf")], json!(3)),
            ]),
        },
        Problem {
            id: "median-sorted-arrays".into(),
            title: "Median of Two Sorted Arrays".into(),
            prompt: "Given two sorted arrays `nums1` and `nums2` of size `m` and `n` \
                     respectively, return **the median** of the two sorted arrays.\n\n\
                     The overall run time complexity should be `O(log (m+n))`."
                .into(),
            examples: vec![
                Example {
                    input: "nums1 = [1,3], nums2 = [2]".into(),
                    output: "2.00000".into(),
                    explanation: None,
                },
                Example {
                    input: "nums1 = [1,2], nums2 = [3,4]".into(),
                    output: "2.50000".into(),
                    explanation: None,
                },
            ],
            constraints: vec![
                "`nums1.length == m`".into(),
                "`nums2.length == n`".into(),
                "`0 <= m <= 1000`".into(),
                "`0 <= n <= 1000`".into(),
                "`1 <= m + n <= 2000`".into(),
                "`-10^6 <= nums1[i], nums2[i] <= 10^6`".into(),
            ],
            difficulty: Difficulty::Hard,
            starter_code: starter(&[(
                "javascript",
                "/**\n * @param {number[]} nums1\n * @param {number[]} nums2\n * @return {number}\n */\nvar findMedianSortedArrays = function(nums1, nums2) {\n    \n};",
            )]),
            test_cases: cases(&[
                (&[json!([1, 3]), json!([2])], json!(2)),
                (&[json!([1, 2]), json!([3, 4])], json!(2.5)),
                (&[json!([0, 0]), json!([0, 0])], json!(0)),
                (&[json!([]), json!([1])], json!(1)),
                (&[json!([2]), json!([])], json!(2)),
            ]),
        },
    ]
}

fn builtin_tests() -> Vec<Test> {
    vec![
        Test {
            id: "rec-test-1".into(),
            title: "Frontend Developer Screening - Acme Corp".into(),
            description: "A standard screening test for mid-level frontend developers \
                          focusing on core logic and data structures."
                .into(),
            time_limit_minutes: 45,
            allowed_languages: vec!["javascript".into(), "python".into()],
            problem_ids: vec!["two-sum".into()],
            kind: TestKind::Assessment,
        },
        Test {
            id: "rec-test-2".into(),
            title: "Software Engineer Intern - Stark Industries".into(),
            description: "A test for our upcoming internship program. Assesses fundamental \
                          problem solving skills."
                .into(),
            time_limit_minutes: 60,
            allowed_languages: vec![
                "javascript".into(),
                "python".into(),
                "java".into(),
                "cpp".into(),
            ],
            problem_ids: vec!["valid-parentheses".into()],
            kind: TestKind::Assessment,
        },
        Test {
            id: "prac-test-1".into(),
            title: "Easy Algorithm Practice".into(),
            description: "Sharpen your skills with some fundamental algorithm challenges."
                .into(),
            time_limit_minutes: 90,
            allowed_languages: vec![
                "javascript".into(),
                "python".into(),
                "java".into(),
                "cpp".into(),
            ],
            problem_ids: vec!["two-sum".into(), "valid-parentheses".into()],
            kind: TestKind::Practice,
        },
        Test {
            id: "prac-test-2".into(),
            title: "Medium Challenge".into(),
            description: "Test your problem-solving abilities with a medium-difficulty \
                          question."
                .into(),
            time_limit_minutes: 45,
            allowed_languages: vec!["javascript".into(), "python".into()],
            problem_ids: vec!["longest-substring".into()],
            kind: TestKind::Practice,
        },
        Test {
            id: "prac-test-3".into(),
            title: "Advanced Algorithm Challenge".into(),
            description: "Tackle a difficult problem to prepare for competitive interviews."
                .into(),
            time_limit_minutes: 60,
            allowed_languages: vec!["javascript".into()],
            problem_ids: vec!["median-sorted-arrays".into()],
            kind: TestKind::Practice,
        },
    ]
}
